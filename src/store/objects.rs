use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StoredObject {
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// Blob storage for task attachments, addressed by slash-separated keys.
#[async_trait]
pub(crate) trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, bytes: &[u8]) -> Result<(), Error>;

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, Error>;

    /// Keys of every object whose key starts with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, Error>;
}

pub(crate) fn attachment_prefix(task_id: i64) -> String {
    format!("tasks/{task_id}/")
}

/// Reduces an uploaded file name to its final path component, so a crafted
/// name cannot escape the task's prefix. Anything outside `[A-Za-z0-9._-]`
/// becomes `_`, which keeps the name usable as a URL segment.
pub(crate) fn attachment_name(file_name: &str) -> Option<String> {
    let name = Path::new(file_name).file_name()?.to_str()?;

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }

    Some(
        name.chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
                _ => '_',
            })
            .collect(),
    )
}

pub(crate) fn attachment_key(task_id: i64, file_name: &str) -> Option<String> {
    attachment_name(file_name).map(|name| format!("{}{}", attachment_prefix(task_id), name))
}

#[derive(Clone, Debug)]
pub(crate) struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, _content_type: &str, bytes: &[u8]) -> Result<(), Error> {
        let path = self.root.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, bytes).await?;

        tracing::debug!("stored {} bytes at {}", bytes.len(), path.display());

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>, Error> {
        let path = self.root.join(key);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::IO(e)),
        };

        // the filesystem keeps no metadata, so the type comes from the name
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        Ok(Some(StoredObject {
            content_type,
            bytes,
        }))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let dir = self.root.join(prefix);

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::IO(e)),
        };

        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                keys.push(format!("{prefix}{name}"));
            }
        }

        keys.sort();

        Ok(keys)
    }
}
