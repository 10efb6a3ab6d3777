//! Checklist entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::checklist::ChecklistFields;
use domain::models::{Checklist, ChecklistState, ChecklistStatus};
use domain::services::StoreError;
use sqlx::FromRow;

/// Database enum for checklist_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "checklist_status")]
pub enum ChecklistStatusDb {
    Unassigned,
    Open,
    Completed,
}

impl From<ChecklistStatusDb> for ChecklistStatus {
    fn from(status: ChecklistStatusDb) -> Self {
        match status {
            ChecklistStatusDb::Unassigned => ChecklistStatus::Unassigned,
            ChecklistStatusDb::Open => ChecklistStatus::Open,
            ChecklistStatusDb::Completed => ChecklistStatus::Completed,
        }
    }
}

impl From<ChecklistStatus> for ChecklistStatusDb {
    fn from(status: ChecklistStatus) -> Self {
        match status {
            ChecklistStatus::Unassigned => ChecklistStatusDb::Unassigned,
            ChecklistStatus::Open => ChecklistStatusDb::Open,
            ChecklistStatus::Completed => ChecklistStatusDb::Completed,
        }
    }
}

/// Database row mapping for the checklists table.
#[derive(Debug, Clone, FromRow)]
pub struct ChecklistEntity {
    pub checklist_id: String,
    pub workflow_id: String,
    pub location_code: String,
    pub title: String,
    pub remarks: Option<String>,
    pub status: ChecklistStatusDb,
    pub assigned_to: Option<String>,
    pub assigned_by: Option<String>,
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

impl TryFrom<ChecklistEntity> for Checklist {
    type Error = StoreError;

    fn try_from(entity: ChecklistEntity) -> Result<Self, Self::Error> {
        let state =
            ChecklistState::from_parts(entity.status.into(), entity.assigned_to, entity.assigned_by)
                .map_err(|e| {
                    StoreError::Corrupt(format!("checklist {}: {}", entity.checklist_id, e))
                })?;

        Ok(Checklist::restore(
            ChecklistFields {
                checklist_id: entity.checklist_id,
                workflow_id: entity.workflow_id,
                location_code: entity.location_code,
                title: entity.title,
                remarks: entity.remarks,
                start_date_time: entity.start_date_time,
                end_date_time: entity.end_date_time,
                created_by: entity.created_by,
                modified_by: entity.modified_by,
                created_date: entity.created_date,
                modified_date: entity.modified_date,
                is_active: entity.is_active,
                scan_start_date: entity.scan_start_date,
                scan_end_date: entity.scan_end_date,
                version: entity.version,
            },
            state,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(status: ChecklistStatusDb, assigned: bool) -> ChecklistEntity {
        let now = Utc::now();
        ChecklistEntity {
            checklist_id: "CHK001".to_string(),
            workflow_id: "WF001".to_string(),
            location_code: "GATE-1".to_string(),
            title: "Gate".to_string(),
            remarks: None,
            status,
            assigned_to: assigned.then(|| "PTR001".to_string()),
            assigned_by: assigned.then(|| "ADM001".to_string()),
            start_date_time: None,
            end_date_time: None,
            created_by: "ADM001".to_string(),
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
            scan_start_date: None,
            scan_end_date: None,
            version: 1,
        }
    }

    #[test]
    fn test_open_row_to_domain() {
        let checklist = Checklist::try_from(entity(ChecklistStatusDb::Open, true)).unwrap();
        assert!(checklist.is_open());
        assert_eq!(checklist.assigned_to(), Some("PTR001"));
        assert_eq!(checklist.version, 1);
    }

    #[test]
    fn test_open_row_without_assignee_is_corrupt() {
        let result = Checklist::try_from(entity(ChecklistStatusDb::Open, false));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
