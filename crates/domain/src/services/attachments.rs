//! Media, signature and history uploads.
//!
//! Files go to a [`BlobStore`] which hands back a retrievable URL; only the
//! metadata record is written to the entity store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use validator::Validate;

use super::directory::require_patrol;
use super::store::EntityStore;
use crate::error::{DomainError, DomainResult};
use crate::models::attachment::{HistoryUploadRequest, MediaUploadRequest, SignatureUploadRequest};
use crate::models::{History, HistoryType, IdFamily, Media, MediaType, Signature, Upload};

/// Default upload ceiling: 5 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg"];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/mpeg", "video/avi", "video/webm"];
const AUDIO_TYPES: &[&str] = &["audio/mpeg", "audio/mp3", "audio/wav", "audio/x-wav", "audio/webm"];
const HISTORY_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/jpg",
    "audio/mpeg",
    "audio/wav",
    "audio/mp3",
    "video/mp4",
    "video/mpeg",
    "video/webm",
];

// ============================================================================
// Upload policy
// ============================================================================

/// Allow-list of MIME types and a size ceiling for one upload category.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub allowed: &'static [&'static str],
    pub max_bytes: usize,
}

impl UploadPolicy {
    pub fn media(media_type: MediaType, max_bytes: usize) -> Self {
        let allowed = match media_type {
            MediaType::Image => IMAGE_TYPES,
            MediaType::Video => VIDEO_TYPES,
            MediaType::Audio => AUDIO_TYPES,
        };
        Self { allowed, max_bytes }
    }

    pub fn signature(max_bytes: usize) -> Self {
        Self {
            allowed: IMAGE_TYPES,
            max_bytes,
        }
    }

    pub fn history(max_bytes: usize) -> Self {
        Self {
            allowed: HISTORY_TYPES,
            max_bytes,
        }
    }

    pub fn check(&self, upload: &Upload) -> DomainResult<()> {
        if upload.bytes.is_empty() {
            return Err(DomainError::Validation("A file is required".to_string()));
        }
        let content_type = upload.content_type.to_ascii_lowercase();
        if !self.allowed.contains(&content_type.as_str()) {
            return Err(DomainError::UnsupportedFormat(format!(
                "Invalid file format: {}. Allowed: {}",
                upload.content_type,
                self.allowed.join(", ")
            )));
        }
        if upload.bytes.len() > self.max_bytes {
            return Err(DomainError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Blob store
// ============================================================================

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Blob storage I/O error: {0}")]
    Io(String),
}

impl From<BlobError> for DomainError {
    fn from(err: BlobError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

/// Stores uploaded bytes and returns a URL they can be fetched from.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persists `upload` under `folder` (`media`, `signatures`, `history`).
    async fn put(&self, folder: &str, upload: &Upload) -> Result<String, BlobError>;
}

/// Keeps blobs in memory. Used by tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(url).cloned()
    }

    pub async fn count(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, folder: &str, upload: &Upload) -> Result<String, BlobError> {
        let mut blobs = self.blobs.write().await;
        let url = format!("memory://{}/{}-{}", folder, blobs.len() + 1, upload.file_name);
        blobs.insert(url.clone(), upload.bytes.clone());
        Ok(url)
    }
}

// ============================================================================
// Service
// ============================================================================

pub struct AttachmentService {
    store: Arc<dyn EntityStore>,
    blobs: Arc<dyn BlobStore>,
    max_upload_bytes: usize,
}

impl AttachmentService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        blobs: Arc<dyn BlobStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            store,
            blobs,
            max_upload_bytes,
        }
    }

    /// Uploads a media file for a patrol, optionally against an active checklist.
    pub async fn upload_media(
        &self,
        request: MediaUploadRequest,
        upload: Upload,
    ) -> DomainResult<Media> {
        request.validate()?;
        let media_type = MediaType::from_str(&request.media_type).map_err(DomainError::Validation)?;
        UploadPolicy::media(media_type, self.max_upload_bytes).check(&upload)?;

        require_patrol(self.store.as_ref(), &request.patrol_id).await?;
        require_patrol(self.store.as_ref(), &request.created_by).await?;

        let checklist_id = non_empty(request.checklist_id);
        if let Some(id) = checklist_id.as_deref() {
            let active = self
                .store
                .find_checklist(id)
                .await?
                .map_or(false, |c| c.is_active);
            if !active {
                return Err(DomainError::NotFound(format!(
                    "Checklist {} not found or inactive",
                    id
                )));
            }
        }

        let media_url = self.blobs.put("media", &upload).await?;
        let now = Utc::now();
        let media = Media {
            multimedia_id: self.store.next_id(IdFamily::Media).await?,
            media_url,
            media_type,
            description: request.description,
            patrol_id: request.patrol_id,
            checklist_id,
            created_by: request.created_by,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_media(&media).await?;

        info!(
            multimedia_id = %media.multimedia_id,
            patrol_id = %media.patrol_id,
            media_type = media.media_type.as_str(),
            bytes = upload.bytes.len(),
            "Media uploaded"
        );
        Ok(media)
    }

    pub async fn upload_signature(
        &self,
        request: SignatureUploadRequest,
        upload: Upload,
    ) -> DomainResult<Signature> {
        request.validate()?;
        UploadPolicy::signature(self.max_upload_bytes).check(&upload)?;

        require_patrol(self.store.as_ref(), &request.patrol_id).await?;
        let checklist_id = non_empty(request.checklist_id);
        if let Some(id) = checklist_id.as_deref() {
            if self.store.find_checklist(id).await?.is_none() {
                return Err(DomainError::not_found(format!("Checklist {}", id)));
            }
        }

        let signature_url = self.blobs.put("signatures", &upload).await?;
        let now = Utc::now();
        let created_time = request
            .created_time
            .unwrap_or_else(|| now.format("%H:%M:%S").to_string());
        let signature = Signature {
            signature_id: self.store.next_id(IdFamily::Signature).await?,
            signature_url,
            patrol_id: request.patrol_id,
            checklist_id,
            created_date: now,
            modified_time: created_time.clone(),
            created_time,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_signature(&signature).await?;

        info!(
            signature_id = %signature.signature_id,
            patrol_id = %signature.patrol_id,
            "Signature uploaded"
        );
        Ok(signature)
    }

    /// Records a patrol event against a checklist assigned to that patrol.
    pub async fn record_history(
        &self,
        request: HistoryUploadRequest,
        upload: Upload,
        created_by: Option<String>,
    ) -> DomainResult<History> {
        request.validate()?;
        let history_type =
            HistoryType::from_str(&request.history_type).map_err(DomainError::Validation)?;
        UploadPolicy::history(self.max_upload_bytes).check(&upload)?;

        let assigned = self
            .store
            .find_checklist(&request.checklist_id)
            .await?
            .map_or(false, |c| c.assigned_to() == Some(request.patrol_id.as_str()));
        if !assigned {
            return Err(DomainError::Validation(format!(
                "Checklist {} is not assigned to patrol {}",
                request.checklist_id, request.patrol_id
            )));
        }

        let date = request
            .date
            .as_deref()
            .and_then(shared::validation::parse_instant)
            .unwrap_or_else(Utc::now);

        let media_url = self.blobs.put("history", &upload).await?;
        let now = Utc::now();
        let history = History {
            history_id: self.store.next_id(IdFamily::History).await?,
            date,
            history_type,
            remarks: request.remarks,
            patrol_id: request.patrol_id,
            checklist_id: request.checklist_id,
            media_url,
            created_by,
            created_date: now,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_history(&history).await?;

        info!(
            history_id = %history.history_id,
            checklist_id = %history.checklist_id,
            "History recorded"
        );
        Ok(history)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
