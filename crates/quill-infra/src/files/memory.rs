//! In-memory file storage - holds uploaded bytes for the life of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::FileRef;
use quill_core::ports::{FileError, FileStorage};

use crate::config::BackendConfig;

struct StoredFile {
    name: String,
    bytes: Vec<u8>,
}

/// Bucket stand-in. View URLs point at the configured endpoint, so they look
/// exactly like the hosted backend's.
pub struct InMemoryFileStorage {
    endpoint: String,
    project_id: String,
    bucket_id: String,
    max_bytes: usize,
    files: RwLock<HashMap<String, StoredFile>>,
}

impl InMemoryFileStorage {
    pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

    pub fn new(config: &BackendConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            bucket_id: config.bucket_id.clone(),
            max_bytes: Self::DEFAULT_MAX_BYTES,
            files: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Original file name of a stored file.
    pub async fn file_name(&self, file: &FileRef) -> Option<String> {
        self.files.read().await.get(file.id()).map(|f| f.name.clone())
    }

    pub async fn contains(&self, file: &FileRef) -> bool {
        self.files.read().await.contains_key(file.id())
    }

    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> Result<FileRef, FileError> {
        if bytes.len() > self.max_bytes {
            return Err(FileError::Rejected(format!(
                "{name} is {} bytes, limit is {}",
                bytes.len(),
                self.max_bytes
            )));
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        tracing::debug!(file_id = %id, name = %name, size = bytes.len(), "File stored");
        self.files.write().await.insert(
            id.clone(),
            StoredFile {
                name: name.to_string(),
                bytes,
            },
        );
        Ok(FileRef::new(id))
    }

    async fn delete_file(&self, file: &FileRef) -> Result<(), FileError> {
        match self.files.write().await.remove(file.id()) {
            Some(removed) => {
                tracing::debug!(file_id = %file.id(), size = removed.bytes.len(), "File deleted");
                Ok(())
            }
            None => Err(FileError::NotFound(file.id().to_string())),
        }
    }

    fn file_view_url(&self, file: &FileRef) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint,
            self.bucket_id,
            file.id(),
            self.project_id
        )
    }
}
