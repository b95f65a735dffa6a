use thiserror::Error;

/// Error returned by every bridge implementation.
///
/// Hosts translate their platform failures into one of these kinds. The
/// core inspects the kind to decide between surfacing a message and
/// degrading silently, so implementations should pick the most specific
/// variant available.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// Network unreachable, timeout, or a non-2xx response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response shape not recognized after every tolerated variant was tried.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// The requested resource does not exist upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` for failures worth retrying later (network blips).
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
