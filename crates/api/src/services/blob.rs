//! Filesystem blob store for uploaded attachments.

use async_trait::async_trait;
use domain::models::Upload;
use domain::services::{BlobError, BlobStore};
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::UploadsConfig;

/// Writes uploads under `<directory>/<folder>/` and hands out URLs below
/// `public_base_url`. The same directory is served at `/uploads`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            root: PathBuf::from(&config.directory),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

/// Keeps ASCII alphanumerics, dots, dashes and underscores.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, folder: &str, upload: &Upload) -> Result<String, BlobError> {
        let dir = self.root.join(folder);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BlobError::Io(format!("create {}: {}", dir.display(), e)))?;

        let name = format!("{}-{}", Uuid::new_v4().simple(), sanitize_file_name(&upload.file_name));
        let path = dir.join(&name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| BlobError::Io(format!("write {}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), bytes = upload.bytes.len(), "Blob stored");
        Ok(format!("{}/{}/{}", self.public_base_url, folder, name))
    }
}
