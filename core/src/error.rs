use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The catalog was not a sequence of record objects.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A query argument was rejected before scanning the index.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self { Self::MalformedInput(msg.into()) }
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self { Self::InvalidArgument(msg.into()) }
}

pub type Result<T> = std::result::Result<T, EngineError>;
