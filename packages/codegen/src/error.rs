use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Document has no root component")]
    MissingRoot,

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] voltron_schema::SchemaError),
}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Non-fatal problem found while generating code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenWarning {
    #[error("{holder} references missing node {target}")]
    DanglingReference { holder: String, target: String },

    #[error("No component config for {config_name} in {dependency}")]
    UnknownComponent {
        config_name: String,
        dependency: String,
    },
}
