//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Schema error: {0}")]
    Schema(#[from] voltron_schema::SchemaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}

impl EditorError {
    /// The mutation error behind this failure, if any
    pub fn as_mutation(&self) -> Option<&crate::mutations::MutationError> {
        match self {
            EditorError::Mutation(e) => Some(e),
            _ => None,
        }
    }
}
