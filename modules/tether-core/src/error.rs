//! Typed errors for dispatch, value encoding and proxy usage.

use thiserror::Error;

/// Failures resolving an incoming event to a handler. Always recovered at the
/// protocol boundary and sent back as `{error: <message>}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("No callback id given.")]
    NoCallbackId,

    #[error("No id registered.")]
    NotRegistered,

    #[error("No child id registered.")]
    ChildNotRegistered,
}

/// A value could not be turned into a JavaScript literal.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Booleans and null have no literal form in the call encoding.
    #[error("could not convert {0} parameter")]
    Unsupported(&'static str),

    /// Event data that should be an object literal isn't one.
    #[error("malformed event data: {0}")]
    MalformedData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Contract violations in the defining script. These abort the response
/// instead of shipping broken JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no name specified for the DOM object")]
    MissingName,

    #[error("too many arguments for {method}: {count} (max 5)")]
    TooManyArguments { method: String, count: usize },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Raised by handler code.
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl EngineError {
    /// Configuration errors are the only ones that must not be turned into a
    /// regular `{error}` payload.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
