use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Payload was not a usable telemetry snapshot. The message is dropped.
    Malformed(String),
    /// Socket connect/read failure.
    Transport(String),
    InvalidConfig(String),
}

pub type ViewResult<T> = Result<T, ViewError>;

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::Malformed(e) => write!(f, "malformed telemetry message: {e}"),
            ViewError::Transport(e) => write!(f, "websocket transport error: {e}"),
            ViewError::InvalidConfig(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ViewError {}
