//! Workflow entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::workflow::WorkflowFields;
use domain::models::{Timeliness, Workflow, WorkflowState, WorkflowStatus};
use domain::services::StoreError;
use sqlx::FromRow;

/// Database enum for workflow_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "workflow_status")]
pub enum WorkflowStatusDb {
    Pending,
    Inprogress,
    Completed,
}

impl From<WorkflowStatusDb> for WorkflowStatus {
    fn from(status: WorkflowStatusDb) -> Self {
        match status {
            WorkflowStatusDb::Pending => WorkflowStatus::Pending,
            WorkflowStatusDb::Inprogress => WorkflowStatus::Inprogress,
            WorkflowStatusDb::Completed => WorkflowStatus::Completed,
        }
    }
}

impl From<WorkflowStatus> for WorkflowStatusDb {
    fn from(status: WorkflowStatus) -> Self {
        match status {
            WorkflowStatus::Pending => WorkflowStatusDb::Pending,
            WorkflowStatus::Inprogress => WorkflowStatusDb::Inprogress,
            WorkflowStatus::Completed => WorkflowStatusDb::Completed,
        }
    }
}

/// Database enum for workflow_timeliness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "workflow_timeliness")]
pub enum TimelinessDb {
    Ontime,
    Late,
}

impl From<TimelinessDb> for Timeliness {
    fn from(value: TimelinessDb) -> Self {
        match value {
            TimelinessDb::Ontime => Timeliness::Ontime,
            TimelinessDb::Late => Timeliness::Late,
        }
    }
}

impl From<Timeliness> for TimelinessDb {
    fn from(value: Timeliness) -> Self {
        match value {
            Timeliness::Ontime => TimelinessDb::Ontime,
            Timeliness::Late => TimelinessDb::Late,
        }
    }
}

/// Database row mapping for the workflows table.
#[derive(Debug, Clone, FromRow)]
pub struct WorkflowEntity {
    pub workflow_id: String,
    pub workflow_title: String,
    pub description: Option<String>,
    pub status: WorkflowStatusDb,
    pub workflow_status: Option<TimelinessDb>,
    pub assigned_start: Option<DateTime<Utc>>,
    pub assigned_end: Option<DateTime<Utc>>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub created_by: String,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
    pub version: i32,
}

/// Flattened state columns of a workflow, as written to the row.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowStateColumns {
    pub status: WorkflowStatusDb,
    pub workflow_status: Option<TimelinessDb>,
    pub start_date_time: Option<DateTime<Utc>>,
    pub end_date_time: Option<DateTime<Utc>>,
}

impl From<&WorkflowState> for WorkflowStateColumns {
    fn from(state: &WorkflowState) -> Self {
        match state {
            WorkflowState::Pending => Self {
                status: WorkflowStatusDb::Pending,
                workflow_status: None,
                start_date_time: None,
                end_date_time: None,
            },
            WorkflowState::Inprogress { start_date_time } => Self {
                status: WorkflowStatusDb::Inprogress,
                workflow_status: None,
                start_date_time: Some(*start_date_time),
                end_date_time: None,
            },
            WorkflowState::Completed {
                start_date_time,
                end_date_time,
                workflow_status,
            } => Self {
                status: WorkflowStatusDb::Completed,
                workflow_status: Some((*workflow_status).into()),
                start_date_time: *start_date_time,
                end_date_time: Some(*end_date_time),
            },
        }
    }
}

impl TryFrom<WorkflowEntity> for Workflow {
    type Error = StoreError;

    fn try_from(entity: WorkflowEntity) -> Result<Self, Self::Error> {
        let state = WorkflowState::from_parts(
            entity.status.into(),
            entity.start_date_time,
            entity.end_date_time,
            entity.workflow_status.map(Into::into),
        )
        .map_err(|e| StoreError::Corrupt(format!("workflow {}: {}", entity.workflow_id, e)))?;

        Ok(Workflow::restore(
            WorkflowFields {
                workflow_id: entity.workflow_id,
                workflow_title: entity.workflow_title,
                description: entity.description,
                assigned_start: entity.assigned_start,
                assigned_end: entity.assigned_end,
                created_by: entity.created_by,
                modified_by: entity.modified_by,
                created_date: entity.created_date,
                modified_date: entity.modified_date,
                is_active: entity.is_active,
                version: entity.version,
            },
            state,
        ))
    }
}
