use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("source unavailable for {dataset}: {path}: {source}")]
    SourceUnavailable {
        dataset: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt source for {dataset} at line {line}: {message}")]
    CorruptSource {
        dataset: String,
        line: u64,
        message: String,
    },
    #[error("load failed for {dataset} after {attempts} attempts: {message}")]
    LoadFailed {
        dataset: String,
        attempts: u32,
        message: String,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
