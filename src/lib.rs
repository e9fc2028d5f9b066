use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScandexError>;

#[derive(Error, Debug)]
pub enum ScandexError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index artifacts are corrupt: {0}")]
    CorruptArtifact(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod embeddings;
pub mod indexer;
pub mod ocr;
pub mod query;
pub mod ranking;
pub mod store;
