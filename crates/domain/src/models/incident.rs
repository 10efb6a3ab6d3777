//! Incident catalog and reported incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Moderate,
    Major,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Moderate => "Moderate",
            Severity::Major => "Major",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Severity::Low),
            "Moderate" => Ok(Severity::Moderate),
            "Major" => Ok(Severity::Major),
            "Critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Invalid severity: {}. Must be one of: Low, Moderate, Major, Critical",
                s
            )),
        }
    }
}

/// Catalog entry patrols pick from when reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentMaster {
    pub code: String,
    pub incident: String,
    pub severity: Severity,
    pub created_date: DateTime<Utc>,
    pub is_active: bool,
}

/// A reported incident. Name and severity are copied from the catalog at
/// report time and do not follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: Uuid,
    pub incident_name: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub incident_type: String,
    pub patrol_id: String,
    pub date: DateTime<Utc>,
    pub is_active: bool,
}

pub const INCIDENT_TYPE: &str = "incident";

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentMasterRequest {
    #[validate(length(min = 1, max = 50, message = "code must be 1-50 characters"))]
    pub code: String,

    #[validate(length(min = 1, max = 200, message = "incident must be 1-200 characters"))]
    pub incident: String,

    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncidentMasterRequest {
    #[validate(length(min = 1, max = 200, message = "incident must be 1-200 characters"))]
    pub incident: Option<String>,

    pub severity: Option<Severity>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportIncidentsRequest {
    #[validate(length(min = 1, message = "patrolId is required"))]
    pub patrol_id: String,

    #[validate(length(min = 1, message = "incidentCodes must contain at least one code"))]
    pub incident_codes: Vec<String>,
}
