//! Scan and multipart attachment handlers.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use domain::models::attachment::{HistoryUploadRequest, MediaUploadRequest, SignatureUploadRequest};
use domain::models::scan::RecordScanRequest;
use domain::models::{History, Media, Scan, Signature, Upload};
use std::collections::HashMap;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Principal;

/// Text fields plus the single file part of a multipart form.
#[derive(Debug, Default)]
struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<Upload>,
}

impl UploadForm {
    /// Reads every part. The first part carrying a file name is the upload.
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) if form.file.is_none() => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    form.file = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                Some(_) => {
                    return Err(ApiError::Validation(
                        "Exactly one file may be uploaded per request".into(),
                    ))
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&mut self, key: &str) -> String {
        self.take(key).unwrap_or_default()
    }

    fn file(&mut self) -> Result<Upload, ApiError> {
        self.file
            .take()
            .ok_or_else(|| ApiError::Validation("A file part is required".into()))
    }
}

/// POST /api/v1/scans
pub async fn record_scan(
    State(state): State<AppState>,
    principal: Principal,
    Json(request): Json<RecordScanRequest>,
) -> Result<(StatusCode, Json<Scan>), ApiError> {
    let scan = state
        .checklists
        .record_scan_start(request, Some(principal.id))
        .await?;
    Ok((StatusCode::CREATED, Json(scan)))
}

/// POST /api/v1/media (multipart: file, mediaType, patrolId, checklistId?, description?, createdBy?)
pub async fn upload_media(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Media>), ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let request = MediaUploadRequest {
        media_type: form.require("mediaType"),
        description: form.take("description"),
        patrol_id: form.require("patrolId"),
        checklist_id: form.take("checklistId"),
        created_by: form.take("createdBy").unwrap_or(principal.id),
    };
    let upload = form.file()?;

    let media = state.attachments.upload_media(request, upload).await?;
    Ok((StatusCode::CREATED, Json(media)))
}

/// POST /api/v1/signatures (multipart: file, patrolId, checklistId?, createdTime?)
pub async fn upload_signature(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Signature>), ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let request = SignatureUploadRequest {
        patrol_id: form.require("patrolId"),
        checklist_id: form.take("checklistId"),
        created_time: form.take("createdTime"),
    };
    let upload = form.file()?;

    let signature = state.attachments.upload_signature(request, upload).await?;
    Ok((StatusCode::CREATED, Json(signature)))
}

/// POST /api/v1/history (multipart: file, patrolId, checklistId, type, remarks, date?)
pub async fn upload_history(
    State(state): State<AppState>,
    principal: Principal,
    multipart: Multipart,
) -> Result<(StatusCode, Json<History>), ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let request = HistoryUploadRequest {
        patrol_id: form.require("patrolId"),
        checklist_id: form.require("checklistId"),
        history_type: form.require("type"),
        remarks: form.require("remarks"),
        date: form.take("date"),
    };
    let upload = form.file()?;

    let history = state
        .attachments
        .record_history(request, upload, Some(principal.id))
        .await?;
    Ok((StatusCode::CREATED, Json(history)))
}
