//! Appending to a chain and chain file I/O.

use crate::fingerprint::{FingerprintError, Fingerprinter};
use cfgchain_model::{Block, Chain, ConfigPayload, Timestamp, GENESIS_PREV_HASH};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error("deviceId cannot be empty")]
    EmptyDeviceId,

    #[error("payload belongs to device {found}, chain belongs to {expected}")]
    DeviceMismatch { expected: String, found: String },

    #[error("version {proposed} does not follow latest version {latest}")]
    VersionNotIncreasing { latest: u64, proposed: u64 },
}

/// Build a sealed block: derive its fingerprint from the given content.
pub fn seal<D: Serialize>(
    fingerprinter: &Fingerprinter,
    index: u64,
    timestamp: Timestamp,
    data: D,
    prev_hash: impl Into<String>,
) -> Result<Block<D>, FingerprintError> {
    let prev_hash = prev_hash.into();
    let hash = fingerprinter.fingerprint(index, &timestamp, &data, &prev_hash)?;
    Ok(Block {
        index,
        timestamp,
        data,
        prev_hash,
        hash,
    })
}

/// Read a chain file with any payload type.
///
/// Loading as `Chain<serde_json::Value>` accepts blocks whose payload no longer
/// matches [`ConfigPayload`], so that verification can still point at them.
pub fn read_chain_file<D: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Chain<D>, ChainError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Extension trait for [`Chain`] with append and file operations.
pub trait ChainExt {
    /// Append a new block carrying `payload`.
    ///
    /// `index`, `prev_hash` and `hash` are always derived; on an empty chain the
    /// block becomes the genesis block. Returns the appended block.
    fn append_payload(
        &mut self,
        fingerprinter: &Fingerprinter,
        payload: ConfigPayload,
        timestamp: Timestamp,
    ) -> Result<&Block, ChainError>;

    /// Load a chain from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChainError>
    where
        Self: Sized;

    /// Save the chain to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ChainError>;
}

impl ChainExt for Chain {
    fn append_payload(
        &mut self,
        fingerprinter: &Fingerprinter,
        payload: ConfigPayload,
        timestamp: Timestamp,
    ) -> Result<&Block, ChainError> {
        if payload.device_id.is_empty() {
            return Err(ChainError::EmptyDeviceId);
        }

        let (index, prev_hash) = match self.latest() {
            Some(last) => {
                if let Some(owner) = self.device_id() {
                    if owner != payload.device_id {
                        return Err(ChainError::DeviceMismatch {
                            expected: owner.to_string(),
                            found: payload.device_id,
                        });
                    }
                }
                if payload.version <= last.data.version {
                    return Err(ChainError::VersionNotIncreasing {
                        latest: last.data.version,
                        proposed: payload.version,
                    });
                }
                (last.index + 1, last.hash.clone())
            }
            None => (0, GENESIS_PREV_HASH.to_string()),
        };

        let block = seal(fingerprinter, index, timestamp, payload, prev_hash)?;
        debug!(index = block.index, hash = %block.hash, "block sealed");
        self.blocks.push(block);

        let position = self.blocks.len() - 1;
        Ok(&self.blocks[position])
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChainError> {
        read_chain_file(path)
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ChainError> {
        let json = serde_json::to_string_pretty(&self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
