// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Failed to read document {path}: {reason}")]
    DocumentRead { path: PathBuf, reason: String },

    #[error("Document is encrypted and cannot be read: {0}")]
    EncryptedDocument(PathBuf),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid section header pattern: {0}")]
    InvalidHeaderPattern(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("CSV error: {0}")]
    CsvError(String),

    #[error("Required input artifact not found at {0}")]
    MissingInputArtifact(PathBuf),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for StorageError {
    fn from(e: csv::Error) -> Self {
        StorageError::CsvError(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}

impl AppError {
    /// True when the failure is a required upstream artifact that was never produced.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, AppError::Storage(StorageError::MissingInputArtifact(_)))
    }
}
