//! Error types for the Refinery library.

use thiserror::Error;

/// Main error type for Refinery operations.
#[derive(Debug, Error)]
pub enum RefineryError {
    /// An external collaborator could not be reached or answered with a
    /// transport-level failure (timeout, connection error, non-2xx status).
    #[error("collaborator '{collaborator}' unavailable: {message}")]
    CollaboratorUnavailable {
        collaborator: String,
        message: String,
    },

    /// An external collaborator answered, but the payload was empty or
    /// could not be interpreted.
    #[error("collaborator '{collaborator}' returned a malformed response: {message}")]
    CollaboratorMalformed {
        collaborator: String,
        message: String,
    },

    /// A generated procedure failed to parse, raised during execution, or
    /// produced output violating the structural contract.
    #[error("generated procedure rejected: {0}")]
    ContractViolation(String),

    /// The dataset itself is malformed (e.g., ragged rows).
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Refinery operations.
pub type Result<T> = std::result::Result<T, RefineryError>;
