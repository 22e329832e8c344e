use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported dataset format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Malformed dataset {source_name}: {reason}")]
    MalformedDataset { source_name: String, reason: String },

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type DeskResult<T> = Result<T, DeskError>;
