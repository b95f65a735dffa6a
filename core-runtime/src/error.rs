//! Runtime errors raised while wiring the core together.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting is out of range or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required bridge was neither injected nor provided by a shim.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// Process-wide state could not be installed, e.g. a second global
    /// tracing subscriber.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn capability_missing(capability: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CapabilityMissing {
            capability: capability.into(),
            message: message.into(),
        }
    }

    /// Name of the missing bridge, for `CapabilityMissing`.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Error::CapabilityMissing { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
