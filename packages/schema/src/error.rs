use thiserror::Error;

/// Errors raised while loading or interpreting page documents
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid key path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SchemaResult<T> = Result<T, SchemaError>;
