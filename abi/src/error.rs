use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalysisError {
    /// Malformed address or token reference.
    #[error("validation error: {0}")]
    Validation(String),
    /// Network failure, timeout or non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),
    /// RPC-level error field, or a result missing its expected shape.
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalysisError::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            AnalysisError::Rpc(format!("undecodable response: {}", err))
        } else {
            AnalysisError::Transport(err.to_string())
        }
    }
}
