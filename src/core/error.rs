use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed input, rejected before any computation runs
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced unit type, building or tech level is missing from the world tables
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal bookkeeping went wrong (casualty sums, loss-rate bounds)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
