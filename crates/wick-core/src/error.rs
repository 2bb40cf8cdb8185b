use thiserror::Error;

use crate::http::HttpError;

#[derive(Error, Debug)]
pub enum WickError {
    // Manifest errors
    #[error("Failed to parse manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    // Service errors
    #[error("Service has not been started")]
    ServiceNotStarted,

    #[error("Pak not found: {name}")]
    PakNotFound { name: String },

    // Chunk errors
    #[error("No chunk metadata for {guid}")]
    ChunkNotFound { guid: String },

    #[error("Invalid chunk: {reason}")]
    InvalidChunk { reason: String },

    // Pak archive errors
    #[error("Invalid pak: {reason}")]
    InvalidPak { reason: String },

    #[error("Invalid AES key: {reason}")]
    InvalidKey { reason: String },

    #[error("Checksum mismatch for {context}")]
    ChecksumMismatch { context: String },

    #[error("File not found in pak: {name}")]
    FileNotFound { name: String },

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] HttpError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, WickError>;
