//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod attachment;
pub mod checklist;
pub mod company;
pub mod incident;
pub mod user;
pub mod workflow;

pub use attachment::{
    HistoryEntity, HistoryTypeDb, MediaEntity, MediaTypeDb, ScanEntity, ScanStatusDb, ScanTypeDb,
    SignatureEntity,
};
pub use checklist::{ChecklistEntity, ChecklistStatusDb};
pub use company::{CompanyEntity, LocationEntity};
pub use incident::{IncidentEntity, IncidentMasterEntity, SeverityDb};
pub use user::{UserEntity, UserRoleDb};
pub use workflow::{TimelinessDb, WorkflowEntity, WorkflowStateColumns, WorkflowStatusDb};
