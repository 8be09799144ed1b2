//! Media upload seam.
//!
//! Services depend on `MediaStorage`; production wires in
//! `s3_utils::S3Operations`, tests substitute an in-memory bucket.

use chrono::{DateTime, Utc};
use s3_utils::{S3Operations, StorageResult};
use uuid::Uuid;

/// A file attached to a post or profile update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    /// Text after the last `.` of the file name, or the whole name
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => &self.file_name,
        }
    }
}

#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `bytes` under `key` and return the public URL
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> StorageResult<String>;

    /// Remove an object previously uploaded under `key`
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

#[async_trait::async_trait]
impl MediaStorage for S3Operations {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.upload_object(key, bytes, content_type).await
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.delete_object(key).await
    }
}

/// Bucket key `{folder}/{owner}-{unix_millis}.{ext}`
pub fn object_key(folder: &str, owner: Uuid, file: &FileUpload, now: DateTime<Utc>) -> String {
    format!(
        "{}/{}-{}.{}",
        folder,
        owner,
        now.timestamp_millis(),
        file.extension()
    )
}
