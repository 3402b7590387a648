//! Error types for request adaptation.

use thiserror::Error;

/// Boxed transport error carried by inbound body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons an inbound request fails to reach the application delegate.
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("request body exceeds maximum of {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Body(#[source] BoxError),

    #[error("request processor {index} dropped its completion without signalling")]
    ProcessorAbandoned { index: usize },
}

impl AdapterError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::BodyTooLarge { .. } => "body_too_large",
            AdapterError::Body(_) => "body_read",
            AdapterError::ProcessorAbandoned { .. } => "processor_abandoned",
        }
    }
}

/// Failure of the inbound request's own absolute-URI accessor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("illegal character {ch:?} at offset {offset}")]
    IllegalCharacter { ch: char, offset: usize },

    #[error("missing host for absolute URI")]
    MissingHost,

    #[error("invalid URI: {0}")]
    Parse(#[from] url::ParseError),
}
