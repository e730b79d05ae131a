//! cfgchain CLI library components.
//!
//! Exposes the command handlers and settings loader so they can be tested
//! without spawning the binary.

pub mod commands;
pub mod settings;
