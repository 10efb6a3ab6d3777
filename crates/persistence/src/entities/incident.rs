//! Incident catalog and incident entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Incident, IncidentMaster, Severity};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for incident_severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "incident_severity")]
pub enum SeverityDb {
    Low,
    Moderate,
    Major,
    Critical,
}

impl From<SeverityDb> for Severity {
    fn from(value: SeverityDb) -> Self {
        match value {
            SeverityDb::Low => Severity::Low,
            SeverityDb::Moderate => Severity::Moderate,
            SeverityDb::Major => Severity::Major,
            SeverityDb::Critical => Severity::Critical,
        }
    }
}

impl From<Severity> for SeverityDb {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Low => SeverityDb::Low,
            Severity::Moderate => SeverityDb::Moderate,
            Severity::Major => SeverityDb::Major,
            Severity::Critical => SeverityDb::Critical,
        }
    }
}

/// Database row mapping for the incident_masters table.
#[derive(Debug, Clone, FromRow)]
pub struct IncidentMasterEntity {
    pub code: String,
    pub incident: String,
    pub severity: SeverityDb,
    pub created_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<IncidentMasterEntity> for IncidentMaster {
    fn from(entity: IncidentMasterEntity) -> Self {
        Self {
            code: entity.code,
            incident: entity.incident,
            severity: entity.severity.into(),
            created_date: entity.created_date,
            is_active: entity.is_active,
        }
    }
}

/// Database row mapping for the incidents table.
#[derive(Debug, Clone, FromRow)]
pub struct IncidentEntity {
    pub id: Uuid,
    pub incident_name: String,
    pub severity: SeverityDb,
    pub incident_type: String,
    pub patrol_id: String,
    pub date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<IncidentEntity> for Incident {
    fn from(entity: IncidentEntity) -> Self {
        Self {
            id: entity.id,
            incident_name: entity.incident_name,
            severity: entity.severity.into(),
            incident_type: entity.incident_type,
            patrol_id: entity.patrol_id,
            date: entity.date,
            is_active: entity.is_active,
        }
    }
}
