use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid strategy parameters: {0}")]
    InvalidParameters(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
