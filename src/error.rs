//! Error types produced by the racc core.
//!
//! | Error | Raised by | Fatal? |
//! |-------|-----------|--------|
//! | [`Config`](RaccError::Config) | alt-text loading | no, startup falls back to defaults |
//! | [`AssetRead`](RaccError::AssetRead) | file lookup and reads | no, per request |
//! | [`InvalidIndex`](RaccError::InvalidIndex) | index/query parsing | no, per request |
//! | [`IndexOutOfRange`](RaccError::IndexOutOfRange) | strict index policy | no, per request |
//! | [`Storage`](RaccError::Storage) | request counter backends | no, per request |

use std::path::PathBuf;

use thiserror::Error;

use crate::kind::AssetKind;

/// Convenience alias used throughout the core.
pub type Result<T> = std::result::Result<T, RaccError>;

#[derive(Debug, Error)]
pub enum RaccError {
    #[error("failed to load {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to read {kind} #{index}: {source}")]
    AssetRead {
        kind: AssetKind,
        index: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid index parameter: {0}")]
    InvalidIndex(String),

    #[error("{kind} #{index} is outside the available range 1..={max}")]
    IndexOutOfRange { kind: AssetKind, index: u32, max: u32 },

    #[error("request counter unavailable: {0}")]
    Storage(String),
}

impl RaccError {
    pub(crate) fn storage(msg: impl Into<String>) -> Self {
        RaccError::Storage(msg.into())
    }

    /// True when the error is the per-request "file missing or unreadable" case.
    pub fn is_asset_read(&self) -> bool {
        matches!(self, RaccError::AssetRead { .. })
    }
}
