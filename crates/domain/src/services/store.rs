//! Entity store contract.
//!
//! Lifecycle engines, directory and reporting services operate exclusively
//! through this trait. The store enforces no referential integrity; every
//! reference is validated by the services before a write.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Checklist, ChecklistStatus, Company, History, IdFamily, Incident, IncidentMaster, Location,
    Media, Role, Scan, Signature, User, Workflow, WorkflowStatus,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The stored version no longer matches the version the caller read.
    #[error("{entity} {id} was modified concurrently")]
    VersionConflict { entity: &'static str, id: String },

    #[error("Duplicate {0}")]
    Duplicate(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Workflow listing filter. `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct WorkflowFilter {
    pub status: Option<WorkflowStatus>,
    pub is_active: Option<bool>,
}

/// Checklist listing filter. `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct ChecklistFilter {
    pub workflow_id: Option<String>,
    pub workflow_ids: Option<Vec<String>>,
    pub assigned_to: Option<String>,
    pub status: Option<ChecklistStatus>,
    pub is_active: Option<bool>,
}

impl ChecklistFilter {
    pub fn for_workflow(workflow_id: &str) -> Self {
        Self {
            workflow_id: Some(workflow_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_patrol(patrol_id: &str) -> Self {
        Self {
            assigned_to: Some(patrol_id.to_string()),
            ..Default::default()
        }
    }

    pub fn matches(&self, checklist: &Checklist) -> bool {
        self.workflow_id
            .as_deref()
            .map_or(true, |id| checklist.workflow_id == id)
            && self
                .workflow_ids
                .as_ref()
                .map_or(true, |ids| ids.iter().any(|id| *id == checklist.workflow_id))
            && self
                .assigned_to
                .as_deref()
                .map_or(true, |patrol| checklist.assigned_to() == Some(patrol))
            && self.status.map_or(true, |status| checklist.status() == status)
            && self.is_active.map_or(true, |active| checklist.is_active == active)
    }
}

/// Which attachments of a patrol to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentScope {
    #[default]
    All,
    /// Only attachments without a checklist link.
    General,
}

impl AttachmentScope {
    pub fn admits(&self, checklist_id: Option<&str>) -> bool {
        match self {
            AttachmentScope::All => true,
            AttachmentScope::General => checklist_id.is_none(),
        }
    }
}

/// Persistence contract for every entity the backend owns.
///
/// Listing methods return records ordered by creation time, oldest first.
#[async_trait]
pub trait EntityStore: Send + Sync {
    // ========================================================================
    // Identifiers
    // ========================================================================

    /// Atomically advances the family counter and renders the new id.
    ///
    /// The counter never falls behind identifiers already stored.
    async fn next_id(&self, family: IdFamily) -> StoreResult<String>;

    /// Cheap liveness probe for readiness checks.
    async fn ping(&self) -> StoreResult<()>;

    // ========================================================================
    // Companies & locations
    // ========================================================================

    async fn insert_company(&self, company: &Company) -> StoreResult<()>;
    async fn find_company(&self, company_code: &str) -> StoreResult<Option<Company>>;
    async fn find_company_by_name_and_location(
        &self,
        company_name: &str,
        company_location: &str,
    ) -> StoreResult<Option<Company>>;
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;

    async fn insert_location(&self, location: &Location) -> StoreResult<()>;
    async fn find_location_by_code(&self, location_code: &str) -> StoreResult<Option<Location>>;
    async fn list_locations(&self) -> StoreResult<Vec<Location>>;

    // ========================================================================
    // Users
    // ========================================================================

    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    /// Looks up a user by role-specific id (ADM### or PTR###).
    async fn find_user(&self, role: Role, role_id: &str) -> StoreResult<Option<User>>;
    /// Looks up a user whose username or email equals `login`.
    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Vec<User>>;
    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<()>;
    async fn delete_user(&self, role: Role, role_id: &str) -> StoreResult<bool>;

    // ========================================================================
    // Workflows
    // ========================================================================

    async fn insert_workflow(&self, workflow: &Workflow) -> StoreResult<()>;
    async fn find_workflow(&self, workflow_id: &str) -> StoreResult<Option<Workflow>>;
    async fn find_workflow_by_title(&self, title: &str) -> StoreResult<Option<Workflow>>;
    async fn list_workflows(&self, filter: &WorkflowFilter) -> StoreResult<Vec<Workflow>>;
    /// Writes `workflow` if the stored version equals `workflow.version`.
    /// Returns the stored copy with its bumped version.
    async fn update_workflow(&self, workflow: &Workflow) -> StoreResult<Workflow>;
    async fn delete_workflow(&self, workflow_id: &str) -> StoreResult<bool>;

    // ========================================================================
    // Checklists
    // ========================================================================

    async fn insert_checklist(&self, checklist: &Checklist) -> StoreResult<()>;
    async fn find_checklist(&self, checklist_id: &str) -> StoreResult<Option<Checklist>>;
    async fn find_checklists(&self, checklist_ids: &[String]) -> StoreResult<Vec<Checklist>>;
    async fn list_checklists(&self, filter: &ChecklistFilter) -> StoreResult<Vec<Checklist>>;
    async fn count_checklists(&self, workflow_id: &str) -> StoreResult<u64>;
    /// Version-checked single update, see [`EntityStore::update_workflow`].
    async fn update_checklist(&self, checklist: &Checklist) -> StoreResult<Checklist>;
    /// Version-checked batch update. Either every row is written or none.
    async fn update_checklists(&self, checklists: &[Checklist]) -> StoreResult<Vec<Checklist>>;

    // ========================================================================
    // Scans & attachments
    // ========================================================================

    async fn insert_scan(&self, scan: &Scan) -> StoreResult<()>;
    async fn list_scans(&self, checklist_id: &str) -> StoreResult<Vec<Scan>>;

    async fn insert_media(&self, media: &Media) -> StoreResult<()>;
    async fn list_media(&self, patrol_id: &str, scope: AttachmentScope) -> StoreResult<Vec<Media>>;

    async fn insert_signature(&self, signature: &Signature) -> StoreResult<()>;
    async fn list_signatures(
        &self,
        patrol_id: &str,
        scope: AttachmentScope,
    ) -> StoreResult<Vec<Signature>>;

    async fn insert_history(&self, history: &History) -> StoreResult<()>;

    // ========================================================================
    // Incidents
    // ========================================================================

    async fn insert_incident_master(&self, master: &IncidentMaster) -> StoreResult<()>;
    async fn find_incident_master(&self, code: &str) -> StoreResult<Option<IncidentMaster>>;
    async fn find_incident_masters(&self, codes: &[String]) -> StoreResult<Vec<IncidentMaster>>;
    async fn list_incident_masters(&self) -> StoreResult<Vec<IncidentMaster>>;
    async fn update_incident_master(&self, master: &IncidentMaster) -> StoreResult<()>;

    async fn insert_incidents(&self, incidents: &[Incident]) -> StoreResult<()>;
}
