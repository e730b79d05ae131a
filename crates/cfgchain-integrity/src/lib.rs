//! Chain integrity engine: fingerprinting, linking and verification of
//! configuration chains.
//!
//! A block's fingerprint is a digest over the concatenation of its index
//! (decimal), its timestamp text, the canonical JSON of its payload and the
//! previous block's fingerprint, encoded as lowercase hex. Verification
//! re-derives every fingerprint and checks every link, reporting block by block.
//!
//! # Example
//!
//! ```
//! use cfgchain_integrity::{verify_chain, ChainExt, Fingerprinter};
//! use cfgchain_model::{Chain, ChangeType, ConfigPayload, Timestamp};
//!
//! let fingerprinter = Fingerprinter::default();
//! let mut chain: Chain = Chain::new();
//!
//! let payload = ConfigPayload {
//!     device_id: "RTR01-NYC".to_string(),
//!     version: 1,
//!     operator: "system".to_string(),
//!     config: "hostname RTR01-NYC\n!\nend".to_string(),
//!     diff: "Initial configuration.".to_string(),
//!     change_type: ChangeType::Initial,
//!     summary: String::new(),
//!     analysis: String::new(),
//!     security_risks: String::new(),
//!     extra: Default::default(),
//! };
//!
//! let block = chain.append_payload(&fingerprinter, payload, Timestamp::now()).unwrap();
//! assert_eq!(block.prev_hash, "0");
//!
//! let verdict = verify_chain(&chain, &fingerprinter).unwrap();
//! assert!(verdict.all_valid);
//! ```

mod canonical;
mod chain;
mod fingerprint;
mod verify;

pub use canonical::canonical_json;
pub use chain::{read_chain_file, seal, ChainError, ChainExt};
pub use fingerprint::{compute_fingerprint, DigestAlgorithm, FingerprintError, Fingerprinter};
pub use verify::{
    verify_chain, verify_chain_with, BlockReport, BlockStatus, ChainVerdict, Verification,
};
