//! Error types for axidb-synth

use axidb_io::IoError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Error, Debug)]
pub enum SynthError {
    /// Database layout or configuration is unusable; raised at open
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The database cannot serve the request (dump type, excitation class)
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// None of the candidate elements contains the point
    #[error("Element not found for point (s={s}, z={z}) among {candidates} candidates")]
    GeometryNotFound { s: f64, z: f64, candidates: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(#[from] IoError),
}
