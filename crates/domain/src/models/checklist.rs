//! Checklist domain model and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChecklistStatus {
    Unassigned,
    Open,
    Completed,
}

impl ChecklistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::Unassigned => "Unassigned",
            ChecklistStatus::Open => "Open",
            ChecklistStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChecklistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unassigned" => Ok(ChecklistStatus::Unassigned),
            "Open" => Ok(ChecklistStatus::Open),
            "Completed" => Ok(ChecklistStatus::Completed),
            _ => Err(format!(
                "Invalid checklist status: {}. Must be one of: Unassigned, Open, Completed",
                s
            )),
        }
    }
}

/// Lifecycle state. Assignment data only exists once a checklist is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all_fields = "camelCase")]
pub enum ChecklistState {
    Unassigned,
    Open {
        assigned_to: String,
        assigned_by: String,
    },
    Completed {
        assigned_to: String,
        assigned_by: String,
    },
}

impl ChecklistState {
    pub fn status(&self) -> ChecklistStatus {
        match self {
            ChecklistState::Unassigned => ChecklistStatus::Unassigned,
            ChecklistState::Open { .. } => ChecklistStatus::Open,
            ChecklistState::Completed { .. } => ChecklistStatus::Completed,
        }
    }

    /// Rebuilds a state from its flat stored columns.
    pub fn from_parts(
        status: ChecklistStatus,
        assigned_to: Option<String>,
        assigned_by: Option<String>,
    ) -> Result<Self, String> {
        match (status, assigned_to, assigned_by) {
            (ChecklistStatus::Unassigned, _, _) => Ok(ChecklistState::Unassigned),
            (ChecklistStatus::Open, Some(assigned_to), Some(assigned_by)) => {
                Ok(ChecklistState::Open {
                    assigned_to,
                    assigned_by,
                })
            }
            (ChecklistStatus::Completed, Some(assigned_to), Some(assigned_by)) => {
                Ok(ChecklistState::Completed {
                    assigned_to,
                    assigned_by,
                })
            }
            (status, _, _) => Err(format!("{} checklist without assignment", status)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub checklist_id: String,
    pub workflow_id: String,
    pub location_code: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(flatten)]
    state: ChecklistState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_end_date: Option<DateTime<Utc>>,
    pub version: i32,
}

/// Column values used to construct a checklist.
#[derive(Debug, Clone)]
pub struct ChecklistFields {
    pub checklist_id: String,
    pub workflow_id: String,
    pub location_code: String,
    pub title: String,
    pub remarks: Option<String>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub created_by: String,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
    pub scan_start_date: Option<DateTime<Utc>>,
    pub scan_end_date: Option<DateTime<Utc>>,
    pub version: i32,
}

impl Checklist {
    /// A freshly created checklist, always `Unassigned`.
    pub fn new(fields: ChecklistFields) -> Self {
        Self::restore(fields, ChecklistState::Unassigned)
    }

    pub fn restore(fields: ChecklistFields, state: ChecklistState) -> Self {
        Self {
            checklist_id: fields.checklist_id,
            workflow_id: fields.workflow_id,
            location_code: fields.location_code,
            title: fields.title,
            remarks: fields.remarks,
            state,
            start_date_time: fields.start_date_time,
            end_date_time: fields.end_date_time,
            created_by: fields.created_by,
            modified_by: fields.modified_by,
            created_date: fields.created_date,
            modified_date: fields.modified_date,
            is_active: fields.is_active,
            scan_start_date: fields.scan_start_date,
            scan_end_date: fields.scan_end_date,
            version: fields.version,
        }
    }

    pub fn state(&self) -> &ChecklistState {
        &self.state
    }

    pub fn status(&self) -> ChecklistStatus {
        self.state.status()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ChecklistState::Open { .. })
    }

    pub fn assigned_to(&self) -> Option<&str> {
        match &self.state {
            ChecklistState::Unassigned => None,
            ChecklistState::Open { assigned_to, .. }
            | ChecklistState::Completed { assigned_to, .. } => Some(assigned_to),
        }
    }

    pub fn assigned_by(&self) -> Option<&str> {
        match &self.state {
            ChecklistState::Unassigned => None,
            ChecklistState::Open { assigned_by, .. }
            | ChecklistState::Completed { assigned_by, .. } => Some(assigned_by),
        }
    }

    /// Unassigned | Open -> Open with the given assignees.
    pub fn assign(
        &mut self,
        assigned_to: &str,
        assigned_by: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let ChecklistState::Completed { .. } = self.state {
            return Err(DomainError::InvalidState(format!(
                "Checklist {} is already completed and cannot be reassigned",
                self.checklist_id
            )));
        }
        self.state = ChecklistState::Open {
            assigned_to: assigned_to.to_string(),
            assigned_by: assigned_by.to_string(),
        };
        self.modified_date = now;
        Ok(())
    }

    /// Open -> Completed. Deactivates the checklist.
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match std::mem::replace(&mut self.state, ChecklistState::Unassigned) {
            ChecklistState::Open {
                assigned_to,
                assigned_by,
            } => {
                self.state = ChecklistState::Completed {
                    assigned_to,
                    assigned_by,
                };
                self.is_active = false;
                self.modified_date = now;
                Ok(())
            }
            other => {
                let status = other.status();
                self.state = other;
                Err(DomainError::InvalidState(format!(
                    "Checklist {} is {} and cannot be completed",
                    self.checklist_id, status
                )))
            }
        }
    }

    /// Field edits are locked unless the checklist is Open.
    pub fn ensure_editable(&self) -> DomainResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "Checklist {} is {} and can only be edited while Open",
                self.checklist_id,
                self.status()
            )))
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChecklistRequest {
    #[validate(length(min = 1, message = "workflowId is required"))]
    pub workflow_id: String,

    #[validate(length(min = 1, message = "locationCode is required"))]
    pub location_code: String,

    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "remarks must be at most 2000 characters"))]
    pub remarks: Option<String>,

    #[serde(default, deserialize_with = "super::instant::deserialize_option")]
    pub start_date_time: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "super::instant::deserialize_option")]
    pub end_date_time: Option<DateTime<Utc>>,

    #[validate(length(min = 1, message = "createdBy is required"))]
    pub created_by: String,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignChecklistsRequest {
    #[validate(length(min = 1, message = "checklistIds must contain at least one id"))]
    pub checklist_ids: Vec<String>,

    #[validate(length(min = 1, message = "assignedTo is required"))]
    pub assigned_to: String,

    #[validate(length(min = 1, message = "assignedBy is required"))]
    pub assigned_by: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChecklistRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "remarks must be at most 2000 characters"))]
    pub remarks: Option<String>,

    pub assigned_to: Option<String>,

    pub assigned_by: Option<String>,

    pub is_active: Option<bool>,

    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteChecklistsRequest {
    #[validate(length(min = 1, message = "checklistIds must contain at least one id"))]
    pub checklist_ids: Vec<String>,
}

/// Query for checklists assigned to a patrol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedChecklistsQuery {
    pub assigned_to: String,
    pub status: Option<ChecklistStatus>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenChecklistsQuery {
    pub workflow_id: String,
    pub patrol_id: String,
}

// ============================================================================
// Results
// ============================================================================

/// Per-id result of a bulk completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCompletion {
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
}

/// Checklists of one workflow, used by grouped views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowChecklists {
    pub workflow_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_title: Option<String>,
    pub checklists: Vec<Checklist>,
}
