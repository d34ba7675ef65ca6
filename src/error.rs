//! Error types for drover
//!
//! Centralized error handling using thiserror. Iteration failures are not
//! errors: the run loop records them as data in `IterationOutcome` and never
//! propagates them. This type covers the setup path only.

use thiserror::Error;

/// All error types that can occur in drover
#[derive(Debug, Error)]
pub enum DroverError {
    /// Instruction could not be resolved from CLI input
    #[error("Instruction error: {0}")]
    Instruction(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error (config files)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for drover operations
pub type Result<T> = std::result::Result<T, DroverError>;
