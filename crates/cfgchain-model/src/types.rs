//! Block and chain data structures.

use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// `prev_hash` of the genesis block.
pub const GENESIS_PREV_HASH: &str = "0";

/// Why a configuration state was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Baseline configuration captured in the genesis block.
    Initial,
    /// Operator-submitted configuration change.
    Update,
    /// Re-application of an earlier version's configuration.
    Rollback,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Initial => "initial",
            ChangeType::Update => "update",
            ChangeType::Rollback => "rollback",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `data` object of a block.
///
/// Keys not modelled here are kept in `extra` so that chains written by other
/// implementations keep hashing to the same digest after a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    /// Owning device identifier (e.g. "RTR01-NYC")
    pub device_id: String,

    /// Configuration version, 1 for the genesis block
    pub version: u64,

    /// Operator who submitted the change
    pub operator: String,

    /// Full configuration text
    pub config: String,

    /// Human-readable diff against the previous version
    pub diff: String,

    pub change_type: ChangeType,

    /// One-sentence summary of the change
    pub summary: String,

    /// Plain-language analysis of the change
    pub analysis: String,

    /// Security notes for the change
    #[serde(rename = "security_risks")]
    pub security_risks: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One immutable configuration state in a device chain.
///
/// The payload type defaults to [`ConfigPayload`]; any serializable value can be
/// chained and verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block<D = ConfigPayload> {
    /// Position in the chain, 0 for genesis
    pub index: u64,

    pub timestamp: Timestamp,

    pub data: D,

    /// Fingerprint of the preceding block, or [`GENESIS_PREV_HASH`]
    pub prev_hash: String,

    /// Fingerprint over `index`, `timestamp`, `data` and `prev_hash`
    pub hash: String,
}

impl<D> Block<D> {
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// The chain of a single device, oldest block first.
///
/// Serialized as a bare JSON array of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chain<D = ConfigPayload> {
    pub blocks: Vec<Block<D>>,
}

impl<D> Chain<D> {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn from_blocks(blocks: Vec<Block<D>>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> Option<&Block<D>> {
        self.blocks.first()
    }

    /// The most recent block.
    pub fn latest(&self) -> Option<&Block<D>> {
        self.blocks.last()
    }

    pub fn get(&self, position: usize) -> Option<&Block<D>> {
        self.blocks.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block<D>> {
        self.blocks.iter()
    }
}

impl<D> Default for Chain<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// Device owning this chain, taken from the genesis block.
    pub fn device_id(&self) -> Option<&str> {
        self.genesis().map(|block| block.data.device_id.as_str())
    }

    /// Block recording the given configuration version.
    pub fn find_version(&self, version: u64) -> Option<&Block> {
        self.blocks.iter().find(|block| block.data.version == version)
    }
}

impl<'a, D> IntoIterator for &'a Chain<D> {
    type Item = &'a Block<D>;
    type IntoIter = std::slice::Iter<'a, Block<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
