//! Block timestamps.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The stored text was not a valid RFC 3339 timestamp.
#[derive(Debug, Error)]
#[error("invalid timestamp {text:?}: {source}")]
pub struct TimestampError {
    text: String,
    #[source]
    source: chrono::ParseError,
}

/// Point in time at which a block was created.
///
/// The ISO-8601 text is kept exactly as stored because it is hashed
/// byte-for-byte; re-rendering a parsed value could change the digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current UTC time with millisecond precision and a `Z` suffix.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Wrap stored text without validation.
    pub fn from_raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_datetime(&self) -> Result<DateTime<Utc>, TimestampError> {
        DateTime::parse_from_rfc3339(&self.0)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|source| TimestampError {
                text: self.0.clone(),
                source,
            })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
