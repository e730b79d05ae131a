//! Block fingerprint computation.

use crate::canonical::canonical_json;
use cfgchain_model::{Block, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while computing a fingerprint.
///
/// These are engine faults, never verification findings: a chain that cannot
/// be hashed has not been shown to be tampered with.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("hash primitive unavailable: {0}")]
    Unavailable(String),

    #[error("payload is not representable as JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Digest primitive behind block fingerprints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestAlgorithm {
    /// SHA-256, the interchange default
    #[default]
    Sha256,
    /// SHA3-256
    Sha3_256,
}

impl DigestAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha3_256 => "sha3-256",
        }
    }

    fn digest_hex(&self, bytes: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            DigestAlgorithm::Sha3_256 => hex::encode(Sha3_256::digest(bytes)),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = FingerprintError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha3-256" | "sha3_256" => Ok(DigestAlgorithm::Sha3_256),
            _ => Err(FingerprintError::Unavailable(name.to_string())),
        }
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = FingerprintError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<DigestAlgorithm> for String {
    fn from(algorithm: DigestAlgorithm) -> Self {
        algorithm.name().to_string()
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Computes block fingerprints with a fixed digest algorithm.
///
/// Stateless apart from the algorithm choice; every call is a pure function of
/// its inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fingerprinter {
    algorithm: DigestAlgorithm,
}

impl Fingerprinter {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Look up the digest primitive by name, failing if it is not available.
    pub fn from_name(name: &str) -> Result<Self, FingerprintError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Fingerprint the content of a block that has not been sealed yet.
    ///
    /// The digest input is `index` in decimal, the timestamp text, the
    /// canonical JSON of `payload` and `prev_hash`, concatenated without
    /// separators.
    pub fn fingerprint<D: Serialize + ?Sized>(
        &self,
        index: u64,
        timestamp: &Timestamp,
        payload: &D,
        prev_hash: &str,
    ) -> Result<String, FingerprintError> {
        let payload = serde_json::to_value(payload)?;

        let mut content = index.to_string();
        content.push_str(timestamp.as_str());
        content.push_str(&canonical_json(&payload)?);
        content.push_str(prev_hash);

        Ok(self.algorithm.digest_hex(content.as_bytes()))
    }

    /// Recompute the fingerprint of a stored block, ignoring its `hash` field.
    pub fn fingerprint_block<D: Serialize>(&self, block: &Block<D>) -> Result<String, FingerprintError> {
        self.fingerprint(block.index, &block.timestamp, &block.data, &block.prev_hash)
    }
}

/// Fingerprint with the default (SHA-256) algorithm.
pub fn compute_fingerprint<D: Serialize + ?Sized>(
    index: u64,
    timestamp: &Timestamp,
    payload: &D,
    prev_hash: &str,
) -> Result<String, FingerprintError> {
    Fingerprinter::default().fingerprint(index, timestamp, payload, prev_hash)
}
