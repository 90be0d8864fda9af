use std::time::Duration;

use thiserror::Error;

/// The external capability an upstream failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Embedding,
    Generation,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Embedding => f.write_str("embedding"),
            Capability::Generation => f.write_str("generation"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A record or request does not match the expected shape. Never coerced.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing table exists with an incompatible schema.
    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("{capability} capability failed: {message}")]
    Upstream { capability: Capability, message: String },

    #[error("{capability} capability timed out after {after:?}: {context}")]
    UpstreamTimeout { capability: Capability, after: Duration, context: String },

    /// Generated output did not conform to the roadmap shape.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn upstream(capability: Capability, message: impl Into<String>) -> Self {
        Error::Upstream { capability, message: message.into() }
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Error::Storage(err.to_string())
    }

    /// True for failures of an external capability (retryable by the caller).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::Upstream { .. } | Error::UpstreamTimeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
