//! Errors of the decoder and its loaders.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiceError {
    /// A symbol outside `1..=num_symbols` of the model.
    #[error("invalid observation {symbol} at position {position}: expected 1..={num_symbols}")]
    InvalidObservation {
        position: usize,
        symbol: u8,
        num_symbols: usize,
    },
    /// Malformed parameter tables. Detected when a model is built.
    #[error("invalid model: {0}")]
    InvalidModel(String),
    /// The DP tables (or the decoded path) could not be allocated.
    #[error("could not allocate a buffer of {cells} cells")]
    ResourceExhausted { cells: usize },
    /// A state index outside `0..num_states` of the model.
    #[error("invalid state {state} at position {position}: expected 0..{num_states}")]
    InvalidState {
        position: usize,
        state: usize,
        num_states: usize,
    },
    /// A state path and a sequence of different lengths.
    #[error("a path of length {path} for a sequence of length {sequence}")]
    LengthMismatch { sequence: usize, path: usize },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("malformed model file: {0}")]
    Json(#[from] serde_json::Error),
}

impl DiceError {
    pub(crate) fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
    pub(crate) fn invalid_model(message: impl Into<String>) -> Self {
        Self::InvalidModel(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DiceError>;
