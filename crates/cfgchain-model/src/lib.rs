//! Data model for per-device configuration chains.
//!
//! A [`Chain`] is an append-only sequence of [`Block`]s. Each block records one
//! configuration state of a network device in its [`ConfigPayload`] and links to
//! its predecessor through `prev_hash`. The serialized layout of these types is
//! the interchange format shared with other implementations:
//!
//! ```json
//! [
//!   {
//!     "index": 0,
//!     "timestamp": "2024-01-01T00:00:00.000Z",
//!     "data": { "deviceId": "RTR01-NYC", "version": 1, "...": "..." },
//!     "prev_hash": "0",
//!     "hash": "9f2c..."
//!   }
//! ]
//! ```
//!
//! Hashing and verification live in `cfgchain-integrity`.

mod timestamp;
mod types;

pub use timestamp::{Timestamp, TimestampError};
pub use types::{Block, ChangeType, Chain, ConfigPayload, GENESIS_PREV_HASH};
