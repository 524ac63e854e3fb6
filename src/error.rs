//! Error types for saavy_poly.
//!
//! Only the non-realtime entry points (construction, `prepare`, snapshot
//! decoding) can fail. The render path clamps or ignores instead.

use thiserror::Error;

/// Result type alias for saavy_poly operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid engine configuration (voice count, sample rate, block size,
    /// channel count).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A persisted parameter document could not be read or written.
    #[cfg(feature = "serde")]
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
