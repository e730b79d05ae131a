//! Chain verification.
//!
//! Blocks are checked in order. At each position the checks run in a fixed
//! precedence and only the first failure is reported:
//!
//! 1. sequence: `index` is 0 for the first block, previous + 1 afterwards
//! 2. link: `prev_hash` equals the previous block's `hash` (`"0"` for genesis)
//! 3. fingerprint: the stored `hash` equals the recomputed digest
//!
//! Verification stops at the first failing block. Mutating any field of the
//! block at position k of a valid chain is therefore reported at position k.

use crate::fingerprint::{FingerprintError, Fingerprinter};
use cfgchain_model::{Block, Chain, GENESIS_PREV_HASH};
use serde::Serialize;
use std::iter::FusedIterator;
use tracing::debug;

/// Outcome of checking a single block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BlockStatus {
    Verified,
    /// `index` does not continue the sequence.
    OutOfSequence { expected: u64, found: u64 },
    /// `prev_hash` does not reference the preceding block.
    BrokenLink { expected: String, found: String },
    /// Stored fingerprint differs from the one recomputed from content.
    Tampered { stored: String, recomputed: String },
}

impl BlockStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, BlockStatus::Verified)
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlockStatus::Verified => "verified",
            BlockStatus::OutOfSequence { .. } => "out of sequence",
            BlockStatus::BrokenLink { .. } => "broken link",
            BlockStatus::Tampered { .. } => "tampered",
        }
    }
}

/// Per-block verification result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    /// Position of the block in the verified sequence
    pub position: usize,
    /// Index stored in the block
    pub index: u64,
    #[serde(flatten)]
    pub status: BlockStatus,
}

/// Overall result of verifying a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainVerdict {
    pub all_valid: bool,
    /// Position of the first failing block
    pub first_invalid: Option<usize>,
    /// Number of blocks examined before stopping
    pub checked: usize,
}

/// Lazy, block-by-block verification of a chain.
///
/// Yields one report per examined block and ends after the first failure or
/// after the last block. A fingerprinting fault is yielded as `Err` and also
/// ends the sequence. Not restartable: create a new `Verification` to re-walk.
#[derive(Debug)]
pub struct Verification<'a, D> {
    blocks: &'a [Block<D>],
    fingerprinter: Fingerprinter,
    position: usize,
    finished: bool,
}

impl<'a, D: Serialize> Verification<'a, D> {
    pub fn new(chain: &'a Chain<D>, fingerprinter: &Fingerprinter) -> Self {
        Self::over(&chain.blocks, fingerprinter)
    }

    /// Verify a bare slice of blocks, the first of which must be genesis.
    pub fn over(blocks: &'a [Block<D>], fingerprinter: &Fingerprinter) -> Self {
        Self {
            blocks,
            fingerprinter: *fingerprinter,
            position: 0,
            finished: false,
        }
    }

    fn check(&self, position: usize, block: &Block<D>) -> Result<BlockStatus, FingerprintError> {
        let previous = position.checked_sub(1).and_then(|p| self.blocks.get(p));

        let expected_index = previous.map_or(0, |prev| prev.index.saturating_add(1));
        if block.index != expected_index {
            return Ok(BlockStatus::OutOfSequence {
                expected: expected_index,
                found: block.index,
            });
        }

        let expected_prev = previous.map_or(GENESIS_PREV_HASH, |prev| prev.hash.as_str());
        if block.prev_hash != expected_prev {
            return Ok(BlockStatus::BrokenLink {
                expected: expected_prev.to_string(),
                found: block.prev_hash.clone(),
            });
        }

        let recomputed = self.fingerprinter.fingerprint_block(block)?;
        if recomputed != block.hash {
            return Ok(BlockStatus::Tampered {
                stored: block.hash.clone(),
                recomputed,
            });
        }

        Ok(BlockStatus::Verified)
    }
}

impl<D: Serialize> Iterator for Verification<'_, D> {
    type Item = Result<BlockReport, FingerprintError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let position = self.position;
        let Some(block) = self.blocks.get(position) else {
            self.finished = true;
            return None;
        };
        self.position += 1;

        let item = self.check(position, block).map(|status| BlockReport {
            position,
            index: block.index,
            status,
        });
        match &item {
            Ok(report) if report.status.is_verified() => {}
            Ok(report) => {
                debug!(position, status = report.status.label(), "chain verification failed");
                self.finished = true;
            }
            Err(err) => {
                debug!(position, error = %err, "fingerprint recomputation failed");
                self.finished = true;
            }
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, Some(self.blocks.len() - self.position))
        }
    }
}

impl<D: Serialize> FusedIterator for Verification<'_, D> {}

/// Verify a chain without progress reporting.
pub fn verify_chain<D: Serialize>(
    chain: &Chain<D>,
    fingerprinter: &Fingerprinter,
) -> Result<ChainVerdict, FingerprintError> {
    verify_chain_with(chain, fingerprinter, |_| {})
}

/// Verify a chain, invoking `on_block` as soon as each block's report is ready.
///
/// An empty chain is valid. A fingerprinting fault aborts with `Err` instead of
/// producing a verdict.
pub fn verify_chain_with<D: Serialize>(
    chain: &Chain<D>,
    fingerprinter: &Fingerprinter,
    mut on_block: impl FnMut(&BlockReport),
) -> Result<ChainVerdict, FingerprintError> {
    let mut checked = 0;
    for report in Verification::new(chain, fingerprinter) {
        let report = report?;
        checked += 1;
        on_block(&report);
        if !report.status.is_verified() {
            return Ok(ChainVerdict {
                all_valid: false,
                first_invalid: Some(report.position),
                checked,
            });
        }
    }
    Ok(ChainVerdict {
        all_valid: true,
        first_invalid: None,
        checked,
    })
}
