use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Invalid market document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScoreError {
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ScoreResult<T> = Result<T, ScoreError>;
