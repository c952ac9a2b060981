use std::fmt;

/// Every failure the network can report. All of them are fatal for a
/// training run; nothing in the crate retries.
#[derive(Debug, Clone, PartialEq)]
pub enum NnError {
    /// Incompatible tensor or layer dimensions.
    ShapeMismatch(String),
    /// An operation was invoked in the wrong lifecycle state, e.g. a
    /// backward pass before any forward pass populated the layer cache.
    StateError(String),
    /// Invalid values reached the loss (NaN probabilities, targets outside [0, 1]).
    NumericError(String),
    /// Reading or writing a saved network failed.
    Io(String),
}

pub type Result<T> = std::result::Result<T, NnError>;

impl fmt::Display for NnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NnError::ShapeMismatch(msg) => write!(f, "shape mismatch: {msg}"),
            NnError::StateError(msg) => write!(f, "invalid state: {msg}"),
            NnError::NumericError(msg) => write!(f, "numeric error: {msg}"),
            NnError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for NnError {}

impl From<std::io::Error> for NnError {
    fn from(err: std::io::Error) -> Self {
        NnError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NnError {
    fn from(err: serde_json::Error) -> Self {
        NnError::Io(err.to_string())
    }
}
