//! Error types for the presenter posture library.
//!
//! The classification core itself never fails: missing keypoints, unknown
//! tracks and stale tracks all degrade to defined defaults. Errors only arise
//! at the edges, when loading configuration or exchanging frames with the
//! upstream and downstream collaborators.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File or stream I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame or report could not be encoded or decoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Smoothing filter could not be built
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
