//! File storage port - featured images live here.

use async_trait::async_trait;

use crate::domain::FileRef;

/// File storage trait - abstraction over the backend's bucket.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store a file and return a reference to it.
    async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> Result<FileRef, FileError>;

    /// Remove a stored file.
    async fn delete_file(&self, file: &FileRef) -> Result<(), FileError>;

    /// Public view URL for a file. Derived from configuration only.
    fn file_view_url(&self, file: &FileRef) -> String;
}

/// File storage errors.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File rejected: {0}")]
    Rejected(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
