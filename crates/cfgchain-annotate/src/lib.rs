//! Building new blocks for a device chain.
//!
//! This crate implements the append procedure: diff the previous configuration
//! against the proposed one, attach human-readable annotations, and seal the
//! result onto the chain through `cfgchain-integrity`. Whether and how
//! annotations are produced is decided here, from [`AnnotationSettings`]; the
//! integrity and diff engines only ever see the finished payload.

mod annotation;
mod builder;
mod settings;

pub use annotation::{
    Annotation, AnnotationError, Annotator, BuiltinDiffAnnotator, ExternalCommandAnnotator,
};
pub use builder::{BlockBuilder, BuildError, Proposal};
pub use settings::{AnnotationProvider, AnnotationSettings};
