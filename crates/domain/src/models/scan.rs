//! Checkpoint scan records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanType {
    QR,
    Barcode,
    NFC,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanType::QR => "QR",
            ScanType::Barcode => "Barcode",
            ScanType::NFC => "NFC",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QR" => Ok(ScanType::QR),
            "Barcode" => Ok(ScanType::Barcode),
            "NFC" => Ok(ScanType::NFC),
            _ => Err(format!(
                "Invalid scanType: {}. Must be one of: QR, Barcode, NFC",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Success,
    Failed,
    Pending,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Success => "Success",
            ScanStatus::Failed => "Failed",
            ScanStatus::Pending => "Pending",
        }
    }
}

impl std::str::FromStr for ScanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(ScanStatus::Success),
            "Failed" => Ok(ScanStatus::Failed),
            "Pending" => Ok(ScanStatus::Pending),
            _ => Err(format!("Invalid scan status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub scan_id: String,
    pub scan_type: ScanType,
    pub checklist_id: String,
    pub scan_start_date: DateTime<Utc>,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

/// Scan start request. `scan_type` is kept as text so unknown values surface
/// as a validation failure rather than a body rejection.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordScanRequest {
    #[validate(length(min = 1, message = "checklistId is required"))]
    pub checklist_id: String,

    #[validate(length(min = 1, message = "scanType is required"))]
    pub scan_type: String,
}
