//! Settings file for the `cfgchain` binary.

use anyhow::{Context, Result};
use camino::Utf8Path;
use cfgchain_annotate::AnnotationSettings;
use cfgchain_integrity::{DigestAlgorithm, Fingerprinter};
use serde::Deserialize;
use std::fs;
use tracing::debug;

/// Settings file read when `--settings` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "cfgchain.toml";

/// Top-level settings. Every table and key is optional.
///
/// ```toml
/// [integrity]
/// algorithm = "sha256"
///
/// [annotation]
/// enabled = true
/// provider = "builtin-diff"
///
/// [verify]
/// delay_ms = 0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub integrity: IntegritySettings,
    pub annotation: AnnotationSettings,
    pub verify: VerifySettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegritySettings {
    /// Digest behind block fingerprints: "sha256" or "sha3-256".
    pub algorithm: DigestAlgorithm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifySettings {
    /// Pause between blocks while verifying, in milliseconds.
    pub delay_ms: u64,
}

impl Settings {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid settings")
    }

    /// Load a settings file that must exist.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {path}"))?;
        let settings =
            Self::parse(&text).with_context(|| format!("failed to load settings from {path}"))?;
        debug!(%path, algorithm = %settings.integrity.algorithm, "settings loaded");
        Ok(settings)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_optional(path: &Utf8Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn fingerprinter(&self) -> Fingerprinter {
        Fingerprinter::new(self.integrity.algorithm)
    }
}
