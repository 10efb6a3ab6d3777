//! Workflow domain model and its lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::{DomainError, DomainResult};

// ============================================================================
// Status enums
// ============================================================================

/// Flat status discriminant, used for storage and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    Pending,
    Inprogress,
    Completed,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "Pending",
            WorkflowStatus::Inprogress => "Inprogress",
            WorkflowStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(WorkflowStatus::Pending),
            "Inprogress" => Ok(WorkflowStatus::Inprogress),
            "Completed" => Ok(WorkflowStatus::Completed),
            _ => Err(format!(
                "Invalid workflow status: {}. Must be one of: Pending, Inprogress, Completed",
                s
            )),
        }
    }
}

/// Whether a workflow finished inside its assigned window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeliness {
    Ontime,
    Late,
}

impl Timeliness {
    /// `Late` only when an assigned end exists and completion is strictly after it.
    pub fn assess(completed_at: DateTime<Utc>, assigned_end: Option<DateTime<Utc>>) -> Self {
        match assigned_end {
            Some(end) if completed_at > end => Timeliness::Late,
            _ => Timeliness::Ontime,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeliness::Ontime => "Ontime",
            Timeliness::Late => "Late",
        }
    }
}

impl std::str::FromStr for Timeliness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ontime" => Ok(Timeliness::Ontime),
            "Late" => Ok(Timeliness::Late),
            _ => Err(format!("Invalid workflow timeliness: {}", s)),
        }
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Lifecycle state. Each variant carries only the data valid in that state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all_fields = "camelCase")]
pub enum WorkflowState {
    Pending,
    Inprogress {
        start_date_time: DateTime<Utc>,
    },
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_date_time: Option<DateTime<Utc>>,
        end_date_time: DateTime<Utc>,
        workflow_status: Timeliness,
    },
}

impl WorkflowState {
    pub fn status(&self) -> WorkflowStatus {
        match self {
            WorkflowState::Pending => WorkflowStatus::Pending,
            WorkflowState::Inprogress { .. } => WorkflowStatus::Inprogress,
            WorkflowState::Completed { .. } => WorkflowStatus::Completed,
        }
    }

    /// Rebuilds a state from its flat stored columns.
    pub fn from_parts(
        status: WorkflowStatus,
        start_date_time: Option<DateTime<Utc>>,
        end_date_time: Option<DateTime<Utc>>,
        workflow_status: Option<Timeliness>,
    ) -> Result<Self, String> {
        match status {
            WorkflowStatus::Pending => Ok(WorkflowState::Pending),
            WorkflowStatus::Inprogress => start_date_time
                .map(|start_date_time| WorkflowState::Inprogress { start_date_time })
                .ok_or_else(|| "Inprogress workflow without startDateTime".to_string()),
            WorkflowStatus::Completed => match (end_date_time, workflow_status) {
                (Some(end_date_time), Some(workflow_status)) => Ok(WorkflowState::Completed {
                    start_date_time,
                    end_date_time,
                    workflow_status,
                }),
                _ => Err("Completed workflow without endDateTime or workflowStatus".to_string()),
            },
        }
    }
}

// ============================================================================
// Core Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub workflow_id: String,
    pub workflow_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    state: WorkflowState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_end: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
    /// Optimistic concurrency token, bumped by the store on every update.
    pub version: i32,
}

/// Column values used to construct a workflow.
#[derive(Debug, Clone)]
pub struct WorkflowFields {
    pub workflow_id: String,
    pub workflow_title: String,
    pub description: Option<String>,
    pub assigned_start: Option<DateTime<Utc>>,
    pub assigned_end: Option<DateTime<Utc>>,
    pub created_by: String,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
    pub version: i32,
}

impl Workflow {
    /// A freshly created workflow, always `Pending`.
    pub fn new(fields: WorkflowFields) -> Self {
        Self::restore(fields, WorkflowState::Pending)
    }

    /// Rehydrates a stored workflow in an arbitrary state.
    pub fn restore(fields: WorkflowFields, state: WorkflowState) -> Self {
        Self {
            workflow_id: fields.workflow_id,
            workflow_title: fields.workflow_title,
            description: fields.description,
            state,
            assigned_start: fields.assigned_start,
            assigned_end: fields.assigned_end,
            created_by: fields.created_by,
            modified_by: fields.modified_by,
            created_date: fields.created_date,
            modified_date: fields.modified_date,
            is_active: fields.is_active,
            version: fields.version,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn status(&self) -> WorkflowStatus {
        self.state.status()
    }

    pub fn start_date_time(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            WorkflowState::Pending => None,
            WorkflowState::Inprogress { start_date_time } => Some(*start_date_time),
            WorkflowState::Completed { start_date_time, .. } => *start_date_time,
        }
    }

    pub fn end_date_time(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            WorkflowState::Completed { end_date_time, .. } => Some(*end_date_time),
            _ => None,
        }
    }

    pub fn timeliness(&self) -> Option<Timeliness> {
        match &self.state {
            WorkflowState::Completed { workflow_status, .. } => Some(*workflow_status),
            _ => None,
        }
    }

    /// Pending -> Inprogress.
    pub fn start(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
        match self.state {
            WorkflowState::Pending => {
                self.state = WorkflowState::Inprogress { start_date_time: at };
                self.modified_date = now;
                Ok(())
            }
            _ => Err(DomainError::InvalidState(format!(
                "Workflow {} already started or completed (status {})",
                self.workflow_id,
                self.status()
            ))),
        }
    }

    /// Pending | Inprogress -> Completed. Deactivates the workflow.
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<Timeliness> {
        let start_date_time = match self.state {
            WorkflowState::Pending => None,
            WorkflowState::Inprogress { start_date_time } => Some(start_date_time),
            WorkflowState::Completed { .. } => {
                return Err(DomainError::InvalidState(format!(
                    "Workflow {} is already completed",
                    self.workflow_id
                )))
            }
        };

        let workflow_status = Timeliness::assess(now, self.assigned_end);
        self.state = WorkflowState::Completed {
            start_date_time,
            end_date_time: now,
            workflow_status,
        };
        self.is_active = false;
        self.modified_date = now;
        Ok(workflow_status)
    }

    /// Edits are only accepted before the workflow starts.
    pub fn ensure_editable(&self) -> DomainResult<()> {
        if self.status() == WorkflowStatus::Pending {
            Ok(())
        } else {
            Err(DomainError::InvalidState(format!(
                "Cannot update workflow {} which is not Pending",
                self.workflow_id
            )))
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowRequest {
    #[validate(length(min = 1, max = 200, message = "workflowTitle must be 1-200 characters"))]
    pub workflow_title: String,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "super::instant::deserialize_option")]
    pub assigned_start: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "super::instant::deserialize_option")]
    pub assigned_end: Option<DateTime<Utc>>,

    #[validate(custom(function = "shared::validation::validate_admin_id"))]
    pub created_by: String,

    pub is_active: Option<bool>,
}

/// Field edits for a Pending workflow. Status is never accepted here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflowRequest {
    #[validate(length(min = 1, max = 200, message = "workflowTitle must be 1-200 characters"))]
    pub workflow_title: Option<String>,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "super::instant::deserialize_option")]
    pub assigned_start: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "super::instant::deserialize_option")]
    pub assigned_end: Option<DateTime<Utc>>,

    pub is_active: Option<bool>,

    pub modified_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartWorkflowRequest {
    #[serde(default)]
    pub start_date_time: String,
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of a completion attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    /// Every checklist was completed and the workflow moved to Completed.
    Completed(Workflow),
    /// The workflow had already been completed; nothing changed.
    AlreadyCompleted(Workflow),
    /// Some checklists are still outstanding; nothing changed.
    Outstanding {
        workflow: Workflow,
        outstanding: Vec<String>,
    },
}

impl CompletionOutcome {
    pub fn workflow(&self) -> &Workflow {
        match self {
            CompletionOutcome::Completed(workflow)
            | CompletionOutcome::AlreadyCompleted(workflow)
            | CompletionOutcome::Outstanding { workflow, .. } => workflow,
        }
    }

    pub fn is_completed(&self) -> bool {
        !matches!(self, CompletionOutcome::Outstanding { .. })
    }
}
