//! Genesis, update and rollback block construction.

use crate::annotation::{
    Annotation, AnnotationError, Annotator, BuiltinDiffAnnotator, ExternalCommandAnnotator,
};
use crate::settings::{AnnotationProvider, AnnotationSettings};
use cfgchain_diff::simple_diff;
use cfgchain_integrity::{ChainError, ChainExt, Fingerprinter};
use cfgchain_model::{Block, Chain, ChangeType, ConfigPayload, Timestamp};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("chain has no genesis block")]
    EmptyChain,

    #[error("chain already has a genesis block")]
    AlreadyInitialized,

    #[error("version {0} does not exist in this chain")]
    UnknownVersion(u64),

    #[error("version {0} is already the latest version")]
    RollbackToLatest(u64),
}

/// A block that has been sealed onto a chain.
#[derive(Debug)]
pub struct Proposal<'c> {
    pub block: &'c Block,
    /// False when the annotator failed and the basic diff was recorded instead
    pub annotated: bool,
}

/// Builds blocks for one device chain and appends them.
pub struct BlockBuilder {
    fingerprinter: Fingerprinter,
    annotation_enabled: bool,
    annotator: Box<dyn Annotator>,
    clock: fn() -> Timestamp,
}

impl BlockBuilder {
    /// Builder whose annotator is chosen by `settings.provider`.
    pub fn new(
        fingerprinter: Fingerprinter,
        settings: &AnnotationSettings,
    ) -> Result<Self, BuildError> {
        let annotator: Box<dyn Annotator> = match &settings.provider {
            AnnotationProvider::BuiltinDiff => Box::new(BuiltinDiffAnnotator),
            AnnotationProvider::External { command } => {
                Box::new(ExternalCommandAnnotator::new(command)?)
            }
        };
        Ok(Self::with_annotator(fingerprinter, settings.enabled, annotator))
    }

    pub fn with_annotator(
        fingerprinter: Fingerprinter,
        annotation_enabled: bool,
        annotator: Box<dyn Annotator>,
    ) -> Self {
        Self {
            fingerprinter,
            annotation_enabled,
            annotator,
            clock: Timestamp::now,
        }
    }

    /// Replace the wall clock used to stamp new blocks.
    pub fn with_clock(mut self, clock: fn() -> Timestamp) -> Self {
        self.clock = clock;
        self
    }

    /// Start a chain with the device's baseline configuration.
    pub fn genesis<'c>(
        &self,
        chain: &'c mut Chain,
        device_id: &str,
        operator: &str,
        config: &str,
    ) -> Result<Proposal<'c>, BuildError> {
        if !chain.is_empty() {
            return Err(BuildError::AlreadyInitialized);
        }
        let payload = ConfigPayload {
            device_id: device_id.to_string(),
            version: 1,
            operator: operator.to_string(),
            config: config.to_string(),
            diff: "Initial configuration.".to_string(),
            change_type: ChangeType::Initial,
            summary: "Genesis block - initial configuration".to_string(),
            analysis: "First configuration record for this device and the starting point \
                       of its chain."
                .to_string(),
            security_risks: "Not analysed; this is the baseline configuration.".to_string(),
            extra: BTreeMap::new(),
        };
        self.seal_onto(chain, payload, true)
    }

    /// Record a new configuration submitted by `operator`.
    pub fn update<'c>(
        &self,
        chain: &'c mut Chain,
        operator: &str,
        config: &str,
    ) -> Result<Proposal<'c>, BuildError> {
        let latest = chain.latest().ok_or(BuildError::EmptyChain)?;
        let (annotation, annotated) = self.annotate(&latest.data.config, config);

        let payload = ConfigPayload {
            device_id: latest.data.device_id.clone(),
            version: latest.data.version + 1,
            operator: operator.to_string(),
            config: config.to_string(),
            diff: annotation.diff,
            change_type: ChangeType::Update,
            summary: annotation.summary,
            analysis: annotation.analysis,
            security_risks: annotation.security_risks,
            extra: BTreeMap::new(),
        };
        self.seal_onto(chain, payload, annotated)
    }

    /// Re-apply the configuration of `target_version` as a new block.
    ///
    /// History is preserved: the restored configuration becomes the next
    /// version rather than replacing anything.
    pub fn rollback<'c>(
        &self,
        chain: &'c mut Chain,
        target_version: u64,
        operator: &str,
    ) -> Result<Proposal<'c>, BuildError> {
        let latest = chain.latest().ok_or(BuildError::EmptyChain)?;
        let target = chain
            .find_version(target_version)
            .ok_or(BuildError::UnknownVersion(target_version))?;
        if target.hash == latest.hash {
            return Err(BuildError::RollbackToLatest(target_version));
        }

        let (annotation, annotated) = self.annotate(&latest.data.config, &target.data.config);
        let payload = ConfigPayload {
            device_id: latest.data.device_id.clone(),
            version: latest.data.version + 1,
            operator: operator.to_string(),
            config: target.data.config.clone(),
            diff: annotation.diff,
            change_type: ChangeType::Rollback,
            summary: format!(
                "Configuration rolled back from version {} to version {}.",
                latest.data.version, target_version
            ),
            analysis: annotation.analysis,
            security_risks: annotation.security_risks,
            extra: BTreeMap::new(),
        };
        self.seal_onto(chain, payload, annotated)
    }

    fn annotate(&self, previous: &str, next: &str) -> (Annotation, bool) {
        let basic_diff = || simple_diff(previous, next).render();

        if !self.annotation_enabled {
            let annotation = Annotation {
                diff: basic_diff(),
                summary: "Annotation disabled by settings.".to_string(),
                analysis: "This change was recorded without annotation.".to_string(),
                security_risks: "Not assessed because annotation is disabled.".to_string(),
            };
            return (annotation, true);
        }

        match self
            .annotator
            .annotate(previous, next)
            .and_then(Annotation::validate)
        {
            Ok(annotation) => (annotation, true),
            Err(err) => {
                warn!(error = %err, "annotator failed, recording basic diff");
                let annotation = Annotation {
                    diff: basic_diff(),
                    summary: "Annotation failed; the basic change was recorded.".to_string(),
                    analysis: format!(
                        "Detailed analysis is unavailable because the annotator failed. \
                         The configuration was saved as submitted.\nError details: {err}"
                    ),
                    security_risks: "Security assessment unavailable.".to_string(),
                };
                (annotation, false)
            }
        }
    }

    fn seal_onto<'c>(
        &self,
        chain: &'c mut Chain,
        payload: ConfigPayload,
        annotated: bool,
    ) -> Result<Proposal<'c>, BuildError> {
        let block = chain.append_payload(&self.fingerprinter, payload, (self.clock)())?;
        info!(
            device = %block.data.device_id,
            version = block.data.version,
            change = %block.data.change_type,
            hash = %block.hash,
            "block appended"
        );
        Ok(Proposal { block, annotated })
    }
}
