//! Domain models for the patrol operations backend.

pub mod attachment;
pub mod checklist;
pub mod company;
pub mod ids;
pub mod incident;
pub(crate) mod instant;
pub mod report;
pub mod scan;
pub mod user;
pub mod workflow;

pub use attachment::{History, HistoryType, Media, MediaType, Signature, Upload};
pub use checklist::{Checklist, ChecklistState, ChecklistStatus};
pub use company::{Company, Location};
pub use ids::IdFamily;
pub use incident::{Incident, IncidentMaster, Severity};
pub use scan::{Scan, ScanStatus, ScanType};
pub use user::{Role, User};
pub use workflow::{CompletionOutcome, Timeliness, Workflow, WorkflowState, WorkflowStatus};
