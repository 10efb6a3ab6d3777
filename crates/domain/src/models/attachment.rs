//! Media, signature and history attachments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            _ => Err(format!(
                "Invalid mediaType: {}. Must be one of: image, video, audio",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryType {
    History,
    Media,
    Scan,
}

impl HistoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryType::History => "history",
            HistoryType::Media => "media",
            HistoryType::Scan => "scan",
        }
    }
}

impl std::str::FromStr for HistoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "history" => Ok(HistoryType::History),
            "media" => Ok(HistoryType::Media),
            "scan" => Ok(HistoryType::Scan),
            _ => Err(format!(
                "Invalid type: {}. Must be one of: history, media, scan",
                s
            )),
        }
    }
}

/// An uploaded media file. `checklist_id == None` marks a general attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub multimedia_id: String,
    pub media_url: String,
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub patrol_id: String,
    pub checklist_id: Option<String>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub signature_id: String,
    pub signature_url: String,
    pub patrol_id: String,
    pub checklist_id: Option<String>,
    pub created_date: DateTime<Utc>,
    pub created_time: String,
    pub modified_date: DateTime<Utc>,
    pub modified_time: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub history_id: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub history_type: HistoryType,
    pub remarks: String,
    pub patrol_id: String,
    pub checklist_id: String,
    pub media_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

/// A file received from a client, before it is handed to the blob store.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Text fields accompanying a media upload.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadRequest {
    #[validate(length(min = 1, message = "mediaType is required"))]
    pub media_type: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "patrolId is required"))]
    pub patrol_id: String,
    pub checklist_id: Option<String>,
    #[validate(length(min = 1, message = "createdBy is required"))]
    pub created_by: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignatureUploadRequest {
    #[validate(length(min = 1, message = "patrolId is required"))]
    pub patrol_id: String,
    pub checklist_id: Option<String>,
    /// `HH:MM:SS`; stamped from the server clock when absent.
    #[validate(custom(function = "shared::validation::validate_time_of_day"))]
    pub created_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HistoryUploadRequest {
    #[validate(length(min = 1, message = "patrolId is required"))]
    pub patrol_id: String,
    #[validate(length(min = 1, message = "checklistId is required"))]
    pub checklist_id: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub history_type: String,
    #[validate(length(min = 1, max = 2000, message = "remarks must be 1-2000 characters"))]
    pub remarks: String,
    #[validate(custom(function = "shared::validation::validate_instant"))]
    pub date: Option<String>,
}
