//! Scan, media, signature and history entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{
    History, HistoryType, Media, MediaType, Scan, ScanStatus, ScanType, Signature,
};
use sqlx::FromRow;

/// Database enum for scan_type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "scan_type")]
pub enum ScanTypeDb {
    QR,
    Barcode,
    NFC,
}

impl From<ScanTypeDb> for ScanType {
    fn from(value: ScanTypeDb) -> Self {
        match value {
            ScanTypeDb::QR => ScanType::QR,
            ScanTypeDb::Barcode => ScanType::Barcode,
            ScanTypeDb::NFC => ScanType::NFC,
        }
    }
}

impl From<ScanType> for ScanTypeDb {
    fn from(value: ScanType) -> Self {
        match value {
            ScanType::QR => ScanTypeDb::QR,
            ScanType::Barcode => ScanTypeDb::Barcode,
            ScanType::NFC => ScanTypeDb::NFC,
        }
    }
}

/// Database enum for scan_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "scan_status")]
pub enum ScanStatusDb {
    Success,
    Failed,
    Pending,
}

impl From<ScanStatusDb> for ScanStatus {
    fn from(value: ScanStatusDb) -> Self {
        match value {
            ScanStatusDb::Success => ScanStatus::Success,
            ScanStatusDb::Failed => ScanStatus::Failed,
            ScanStatusDb::Pending => ScanStatus::Pending,
        }
    }
}

impl From<ScanStatus> for ScanStatusDb {
    fn from(value: ScanStatus) -> Self {
        match value {
            ScanStatus::Success => ScanStatusDb::Success,
            ScanStatus::Failed => ScanStatusDb::Failed,
            ScanStatus::Pending => ScanStatusDb::Pending,
        }
    }
}

/// Database enum for media_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
pub enum MediaTypeDb {
    Image,
    Video,
    Audio,
}

impl From<MediaTypeDb> for MediaType {
    fn from(value: MediaTypeDb) -> Self {
        match value {
            MediaTypeDb::Image => MediaType::Image,
            MediaTypeDb::Video => MediaType::Video,
            MediaTypeDb::Audio => MediaType::Audio,
        }
    }
}

impl From<MediaType> for MediaTypeDb {
    fn from(value: MediaType) -> Self {
        match value {
            MediaType::Image => MediaTypeDb::Image,
            MediaType::Video => MediaTypeDb::Video,
            MediaType::Audio => MediaTypeDb::Audio,
        }
    }
}

/// Database enum for history_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "history_type", rename_all = "lowercase")]
pub enum HistoryTypeDb {
    History,
    Media,
    Scan,
}

impl From<HistoryType> for HistoryTypeDb {
    fn from(value: HistoryType) -> Self {
        match value {
            HistoryType::History => HistoryTypeDb::History,
            HistoryType::Media => HistoryTypeDb::Media,
            HistoryType::Scan => HistoryTypeDb::Scan,
        }
    }
}

impl From<HistoryTypeDb> for HistoryType {
    fn from(value: HistoryTypeDb) -> Self {
        match value {
            HistoryTypeDb::History => HistoryType::History,
            HistoryTypeDb::Media => HistoryType::Media,
            HistoryTypeDb::Scan => HistoryType::Scan,
        }
    }
}

/// Database row mapping for the scans table.
#[derive(Debug, Clone, FromRow)]
pub struct ScanEntity {
    pub scan_id: String,
    pub scan_type: ScanTypeDb,
    pub checklist_id: String,
    pub scan_start_date: DateTime<Utc>,
    pub status: ScanStatusDb,
    pub created_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<ScanEntity> for Scan {
    fn from(entity: ScanEntity) -> Self {
        Self {
            scan_id: entity.scan_id,
            scan_type: entity.scan_type.into(),
            checklist_id: entity.checklist_id,
            scan_start_date: entity.scan_start_date,
            status: entity.status.into(),
            created_by: entity.created_by,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            is_active: entity.is_active,
        }
    }
}

/// Database row mapping for the media table.
#[derive(Debug, Clone, FromRow)]
pub struct MediaEntity {
    pub multimedia_id: String,
    pub media_url: String,
    pub media_type: MediaTypeDb,
    pub description: Option<String>,
    pub patrol_id: String,
    pub checklist_id: Option<String>,
    pub created_by: String,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<MediaEntity> for Media {
    fn from(entity: MediaEntity) -> Self {
        Self {
            multimedia_id: entity.multimedia_id,
            media_url: entity.media_url,
            media_type: entity.media_type.into(),
            description: entity.description,
            patrol_id: entity.patrol_id,
            checklist_id: entity.checklist_id,
            created_by: entity.created_by,
            modified_by: entity.modified_by,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            is_active: entity.is_active,
        }
    }
}

/// Database row mapping for the signatures table.
#[derive(Debug, Clone, FromRow)]
pub struct SignatureEntity {
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

impl From<SignatureEntity> for Signature {
    fn from(entity: SignatureEntity) -> Self {
        Self {
            signature_id: entity.signature_id,
            signature_url: entity.signature_url,
            patrol_id: entity.patrol_id,
            checklist_id: entity.checklist_id,
            created_date: entity.created_date,
            created_time: entity.created_time,
            modified_date: entity.modified_date,
            modified_time: entity.modified_time,
            is_active: entity.is_active,
        }
    }
}

/// Database row mapping for the history table.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntity {
    pub history_id: String,
    pub date: DateTime<Utc>,
    pub history_type: HistoryTypeDb,
    pub remarks: String,
    pub patrol_id: String,
    pub checklist_id: String,
    pub media_url: String,
    pub created_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<HistoryEntity> for History {
    fn from(entity: HistoryEntity) -> Self {
        Self {
            history_id: entity.history_id,
            date: entity.date,
            history_type: entity.history_type.into(),
            remarks: entity.remarks,
            patrol_id: entity.patrol_id,
            checklist_id: entity.checklist_id,
            media_url: entity.media_url,
            created_by: entity.created_by,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            is_active: entity.is_active,
        }
    }
}
