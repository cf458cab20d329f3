use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapnormError {
    #[error("not initialized: run 'capnorm init'")]
    NotInitialized,

    #[error("agent store unavailable at {path}: {source}")]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("agent store schema mismatch: {0}")]
    StoreSchema(String),

    #[error("agent not found: {0}")]
    RecordNotFound(String),

    #[error("no open batch: call begin() before {0}")]
    NoBatch(&'static str),

    #[error("migration already in progress: lock held at {path} ({holder})")]
    MaintenanceLocked { path: PathBuf, holder: String },

    #[error("empty label in vocabulary")]
    EmptyLabel,

    #[error("duplicate label in vocabulary: '{0}'")]
    DuplicateLabel(String),

    #[error("vocabulary overlap: literal for '{inner}' occurs inside '{outer}'")]
    VocabularyOverlap { inner: String, outer: String },

    #[error("invalid table name '{0}': must be a plain SQL identifier")]
    InvalidTableName(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CapnormError>;
