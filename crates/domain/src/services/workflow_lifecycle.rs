//! Workflow lifecycle engine.
//!
//! Drives a workflow through `Pending -> Inprogress -> Completed`, validated
//! against its child checklists. Transitions are forward-only.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use super::directory::require_admin;
use super::store::{ChecklistFilter, EntityStore, WorkflowFilter};
use crate::error::{DomainError, DomainResult};
use crate::models::checklist::WorkflowChecklists;
use crate::models::workflow::{CreateWorkflowRequest, UpdateWorkflowRequest, WorkflowFields};
use crate::models::{
    Checklist, ChecklistStatus, CompletionOutcome, IdFamily, Workflow, WorkflowStatus,
};

pub struct WorkflowLifecycle {
    store: Arc<dyn EntityStore>,
}

impl WorkflowLifecycle {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn load(&self, workflow_id: &str) -> DomainResult<Workflow> {
        self.store
            .find_workflow(workflow_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Workflow {}", workflow_id)))
    }

    /// Creates a `Pending` workflow owned by an existing admin.
    pub async fn create(&self, request: CreateWorkflowRequest) -> DomainResult<Workflow> {
        request.validate()?;
        require_admin(self.store.as_ref(), &request.created_by).await?;

        if self
            .store
            .find_workflow_by_title(&request.workflow_title)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Workflow with title '{}' already exists",
                request.workflow_title
            )));
        }

        let now = Utc::now();
        let workflow = Workflow::new(WorkflowFields {
            workflow_id: self.store.next_id(IdFamily::Workflow).await?,
            workflow_title: request.workflow_title,
            description: request.description,
            assigned_start: request.assigned_start,
            assigned_end: request.assigned_end,
            created_by: request.created_by,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: request.is_active.unwrap_or(true),
            version: 0,
        });
        self.store.insert_workflow(&workflow).await?;

        info!(
            workflow_id = %workflow.workflow_id,
            created_by = %workflow.created_by,
            "Workflow created"
        );
        Ok(workflow)
    }

    pub async fn get(&self, workflow_id: &str) -> DomainResult<Workflow> {
        self.load(workflow_id).await
    }

    pub async fn list(&self, filter: WorkflowFilter) -> DomainResult<Vec<Workflow>> {
        Ok(self.store.list_workflows(&filter).await?)
    }

    /// Active checklists of an active workflow.
    pub async fn active_checklists(&self, workflow_id: &str) -> DomainResult<Vec<Checklist>> {
        let workflow = self.load(workflow_id).await?;
        if !workflow.is_active {
            return Err(DomainError::NotFound(format!(
                "Workflow {} is not active",
                workflow_id
            )));
        }

        let filter = ChecklistFilter {
            is_active: Some(true),
            ..ChecklistFilter::for_workflow(workflow_id)
        };
        Ok(self.store.list_checklists(&filter).await?)
    }

    /// Completed workflows with the checklists a patrol worked on.
    /// Workflows the patrol had no checklist in are omitted.
    pub async fn completed_for_patrol(
        &self,
        patrol_id: &str,
    ) -> DomainResult<Vec<WorkflowChecklists>> {
        let completed = self
            .store
            .list_workflows(&WorkflowFilter {
                status: Some(WorkflowStatus::Completed),
                ..Default::default()
            })
            .await?;
        if completed.is_empty() {
            return Ok(Vec::new());
        }

        let filter = ChecklistFilter {
            workflow_ids: Some(completed.iter().map(|w| w.workflow_id.clone()).collect()),
            ..ChecklistFilter::for_patrol(patrol_id)
        };
        let checklists = self.store.list_checklists(&filter).await?;

        Ok(completed
            .into_iter()
            .filter_map(|workflow| {
                let own: Vec<Checklist> = checklists
                    .iter()
                    .filter(|c| c.workflow_id == workflow.workflow_id)
                    .cloned()
                    .collect();
                (!own.is_empty()).then(|| WorkflowChecklists {
                    workflow_id: workflow.workflow_id,
                    workflow_title: Some(workflow.workflow_title),
                    checklists: own,
                })
            })
            .collect())
    }

    /// Edits a `Pending` workflow.
    pub async fn update(
        &self,
        workflow_id: &str,
        request: UpdateWorkflowRequest,
    ) -> DomainResult<Workflow> {
        let mut workflow = self.load(workflow_id).await?;
        workflow.ensure_editable()?;
        request.validate()?;

        if let Some(title) = request.workflow_title {
            if title != workflow.workflow_title {
                if self.store.find_workflow_by_title(&title).await?.is_some() {
                    return Err(DomainError::Conflict(format!(
                        "Another workflow with title '{}' already exists",
                        title
                    )));
                }
                workflow.workflow_title = title;
            }
        }
        if let Some(description) = request.description {
            workflow.description = Some(description);
        }
        if let Some(assigned_start) = request.assigned_start {
            workflow.assigned_start = Some(assigned_start);
        }
        if let Some(assigned_end) = request.assigned_end {
            workflow.assigned_end = Some(assigned_end);
        }
        if let Some(is_active) = request.is_active {
            workflow.is_active = is_active;
        }
        workflow.modified_by = request.modified_by;
        workflow.modified_date = Utc::now();

        let stored = self.store.update_workflow(&workflow).await?;
        info!(workflow_id = %workflow_id, "Workflow updated");
        Ok(stored)
    }

    /// Hard-deletes a workflow in any state. Child checklists are left in place.
    pub async fn delete(&self, workflow_id: &str, requested_by: &str) -> DomainResult<()> {
        match require_admin(self.store.as_ref(), requested_by).await {
            Ok(_) => {}
            Err(DomainError::NotFound(_)) => {
                return Err(DomainError::Forbidden(format!(
                    "{} is not an existing admin",
                    requested_by
                )));
            }
            Err(e) => return Err(e),
        }

        if !self.store.delete_workflow(workflow_id).await? {
            return Err(DomainError::not_found(format!("Workflow {}", workflow_id)));
        }

        info!(workflow_id = %workflow_id, deleted_by = %requested_by, "Workflow deleted");
        Ok(())
    }

    /// `Pending -> Inprogress`. Requires at least one checklist and a
    /// parseable start instant.
    pub async fn start(&self, workflow_id: &str, start_date_time: &str) -> DomainResult<Workflow> {
        let mut workflow = self.load(workflow_id).await?;
        if workflow.status() != WorkflowStatus::Pending {
            return Err(DomainError::InvalidState(format!(
                "Workflow {} already started or completed",
                workflow_id
            )));
        }

        if self.store.count_checklists(workflow_id).await? == 0 {
            return Err(DomainError::Validation(format!(
                "Cannot start workflow {} without checklists",
                workflow_id
            )));
        }

        let start_at = shared::validation::parse_instant(start_date_time).ok_or_else(|| {
            DomainError::Validation("Invalid or missing startDateTime".to_string())
        })?;

        workflow.start(start_at, Utc::now())?;
        let stored = self.store.update_workflow(&workflow).await?;

        info!(workflow_id = %workflow_id, start_date_time = %start_at, "Workflow started");
        Ok(stored)
    }

    /// Completes the workflow once every child checklist is `Completed`.
    ///
    /// Outstanding checklists are not an error: the workflow is returned
    /// unchanged together with the outstanding ids. A workflow that is
    /// already completed is returned as is.
    pub async fn attempt_complete(&self, workflow_id: &str) -> DomainResult<CompletionOutcome> {
        let mut workflow = self.load(workflow_id).await?;
        if workflow.status() == WorkflowStatus::Completed {
            return Ok(CompletionOutcome::AlreadyCompleted(workflow));
        }

        let checklists = self
            .store
            .list_checklists(&ChecklistFilter::for_workflow(workflow_id))
            .await?;
        if checklists.is_empty() {
            return Err(DomainError::NotFound(format!(
                "No checklists found for workflow {}",
                workflow_id
            )));
        }

        let outstanding: Vec<String> = checklists
            .iter()
            .filter(|c| c.status() != ChecklistStatus::Completed)
            .map(|c| c.checklist_id.clone())
            .collect();
        if !outstanding.is_empty() {
            warn!(
                workflow_id = %workflow_id,
                outstanding = outstanding.len(),
                "Workflow completion deferred, checklists outstanding"
            );
            return Ok(CompletionOutcome::Outstanding {
                workflow,
                outstanding,
            });
        }

        let timeliness = workflow.complete(Utc::now())?;
        let stored = self.store.update_workflow(&workflow).await?;

        info!(
            workflow_id = %workflow_id,
            workflow_status = timeliness.as_str(),
            "Workflow completed"
        );
        Ok(CompletionOutcome::Completed(stored))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checklist::ChecklistFields;
    use crate::models::user::User;
    use crate::models::{Role, Timeliness};
    use crate::services::memory_store::InMemoryEntityStore;
    use chrono::{DateTime, Duration};

    fn admin(id: &str) -> User {
        let now = Utc::now();
        User {
            username: format!("{}@gmail.com", id.to_lowercase()),
            password_hash: "x".into(),
            patrol_guard_name: "Admin".into(),
            role: Role::Admin,
            admin_id: Some(id.into()),
            patrol_id: None,
            mobile_number: "1".into(),
            email: format!("{}@gmail.com", id.to_lowercase()),
            company_code: "CMP001".into(),
            image_url: None,
            department: None,
            designation: None,
            otp_hash: None,
            otp_expires_at: None,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
        }
    }

    async fn setup() -> (Arc<dyn EntityStore>, WorkflowLifecycle) {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        store.insert_user(&admin("ADM001")).await.unwrap();
        let engine = WorkflowLifecycle::new(store.clone());
        (store, engine)
    }

    fn create_request(title: &str) -> CreateWorkflowRequest {
        CreateWorkflowRequest {
            workflow_title: title.into(),
            description: Some("Perimeter".into()),
            assigned_start: None,
            assigned_end: None,
            created_by: "ADM001".into(),
            is_active: None,
        }
    }

    async fn add_checklist(store: &Arc<dyn EntityStore>, workflow_id: &str) -> Checklist {
        let now = Utc::now();
        let checklist = Checklist::new(ChecklistFields {
            checklist_id: store.next_id(IdFamily::Checklist).await.unwrap(),
            workflow_id: workflow_id.into(),
            location_code: "GATE-1".into(),
            title: "Gate".into(),
            remarks: None,
            start_date_time: None,
            end_date_time: None,
            created_by: "ADM001".into(),
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
            scan_start_date: None,
            scan_end_date: None,
            version: 0,
        });
        store.insert_checklist(&checklist).await.unwrap();
        checklist
    }

    async fn complete_checklist(store: &Arc<dyn EntityStore>, mut checklist: Checklist) {
        checklist.assign("PTR001", "ADM001", Utc::now()).unwrap();
        let mut checklist = store.update_checklist(&checklist).await.unwrap();
        checklist.complete(Utc::now()).unwrap();
        store.update_checklist(&checklist).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_assigns_seed_and_pending() {
        let (_, engine) = setup().await;
        let workflow = engine.create(create_request("Night")).await.unwrap();
        assert_eq!(workflow.workflow_id, "WF001");
        assert_eq!(workflow.status(), WorkflowStatus::Pending);
        assert!(workflow.is_active);
    }

    #[tokio::test]
    async fn test_create_validates_creator() {
        let (_, engine) = setup().await;

        let mut bad_format = create_request("Night");
        bad_format.created_by = "admin-1".into();
        assert!(matches!(
            engine.create(bad_format).await,
            Err(DomainError::Validation(_))
        ));

        let mut unknown = create_request("Night");
        unknown.created_by = "ADM404".into();
        assert!(matches!(
            engine.create(unknown).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title() {
        let (_, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        assert!(matches!(
            engine.create(create_request("Night")).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_start_without_checklists_leaves_pending() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();

        let err = engine
            .start("WF001", "2024-05-01T08:00:00Z")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let stored = store.find_workflow("WF001").await.unwrap().unwrap();
        assert_eq!(stored.status(), WorkflowStatus::Pending);
    }

    #[tokio::test]
    async fn test_start_rejects_bad_timestamp() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        add_checklist(&store, "WF001").await;

        assert!(matches!(
            engine.start("WF001", "not-a-date").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            engine.start("WF001", "").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_start_then_start_again_is_invalid_state() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        add_checklist(&store, "WF001").await;

        let started = engine.start("WF001", "2024-05-01T08:00:00Z").await.unwrap();
        assert_eq!(started.status(), WorkflowStatus::Inprogress);
        assert_eq!(
            started.start_date_time().map(|t| t.to_rfc3339()),
            Some("2024-05-01T08:00:00+00:00".to_string())
        );

        assert!(matches!(
            engine.start("WF001", "2024-05-01T09:00:00Z").await,
            Err(DomainError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_start_unknown_workflow() {
        let (_, engine) = setup().await;
        assert!(matches!(
            engine.start("WF999", "2024-05-01").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_attempt_complete_without_checklists_is_not_found() {
        let (_, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        assert!(matches!(
            engine.attempt_complete("WF001").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_attempt_complete_with_outstanding_is_noop() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        let done = add_checklist(&store, "WF001").await;
        let pending = add_checklist(&store, "WF001").await;
        complete_checklist(&store, done).await;

        match engine.attempt_complete("WF001").await.unwrap() {
            CompletionOutcome::Outstanding {
                workflow,
                outstanding,
            } => {
                assert_eq!(workflow.status(), WorkflowStatus::Pending);
                assert_eq!(outstanding, vec![pending.checklist_id]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_attempt_complete_is_idempotent() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        let checklist = add_checklist(&store, "WF001").await;
        engine.start("WF001", "2024-05-01T08:00:00Z").await.unwrap();
        complete_checklist(&store, checklist).await;

        let first = engine.attempt_complete("WF001").await.unwrap();
        let completed = match first {
            CompletionOutcome::Completed(workflow) => workflow,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(completed.status(), WorkflowStatus::Completed);
        assert!(!completed.is_active);
        assert_eq!(completed.timeliness(), Some(Timeliness::Ontime));

        let second = engine.attempt_complete("WF001").await.unwrap();
        match second {
            CompletionOutcome::AlreadyCompleted(workflow) => {
                assert_eq!(workflow.end_date_time(), completed.end_date_time());
                assert_eq!(workflow.status(), WorkflowStatus::Completed);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_completion_after_assigned_end_is_late() {
        let (store, engine) = setup().await;
        let mut request = create_request("Night");
        request.assigned_end = Some(Utc::now() - Duration::seconds(1));
        engine.create(request).await.unwrap();
        let checklist = add_checklist(&store, "WF001").await;
        complete_checklist(&store, checklist).await;

        let outcome = engine.attempt_complete("WF001").await.unwrap();
        assert_eq!(outcome.workflow().timeliness(), Some(Timeliness::Late));
    }

    #[tokio::test]
    async fn test_completion_before_assigned_end_is_ontime() {
        let (store, engine) = setup().await;
        let mut request = create_request("Night");
        let deadline: DateTime<Utc> = Utc::now() + Duration::hours(1);
        request.assigned_end = Some(deadline);
        engine.create(request).await.unwrap();
        let checklist = add_checklist(&store, "WF001").await;
        complete_checklist(&store, checklist).await;

        let outcome = engine.attempt_complete("WF001").await.unwrap();
        assert_eq!(outcome.workflow().timeliness(), Some(Timeliness::Ontime));
    }

    #[tokio::test]
    async fn test_update_only_while_pending() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        engine.create(create_request("Day")).await.unwrap();

        let renamed = engine
            .update(
                "WF001",
                UpdateWorkflowRequest {
                    workflow_title: Some("Night shift".into()),
                    modified_by: Some("ADM001".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.workflow_title, "Night shift");
        assert_eq!(renamed.version, 1);

        let clash = engine
            .update(
                "WF001",
                UpdateWorkflowRequest {
                    workflow_title: Some("Day".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(clash, Err(DomainError::Conflict(_))));

        add_checklist(&store, "WF001").await;
        engine.start("WF001", "2024-05-01").await.unwrap();
        let locked = engine
            .update("WF001", UpdateWorkflowRequest::default())
            .await;
        assert!(matches!(locked, Err(DomainError::InvalidState(_))));

        let invalid = UpdateWorkflowRequest {
            workflow_title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            engine.update("WF001", invalid).await,
            Err(DomainError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        add_checklist(&store, "WF001").await;

        let mut stale = store.find_workflow("WF001").await.unwrap().unwrap();
        engine.start("WF001", "2024-05-01").await.unwrap();

        stale.description = Some("racing edit".into());
        let err: DomainError = store.update_workflow(&stale).await.unwrap_err().into();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_admin_and_ignores_state() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        add_checklist(&store, "WF001").await;
        engine.start("WF001", "2024-05-01").await.unwrap();

        assert!(matches!(
            engine.delete("WF001", "PTR001").await,
            Err(DomainError::Forbidden(_))
        ));
        engine.delete("WF001", "ADM001").await.unwrap();
        assert!(store.find_workflow("WF001").await.unwrap().is_none());
        assert_eq!(store.count_checklists("WF001").await.unwrap(), 1);

        assert!(matches!(
            engine.delete("WF001", "ADM001").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_surfaces_store_failure() {
        let store = Arc::new(InMemoryEntityStore::new());
        store.insert_user(&admin("ADM001")).await.unwrap();
        let engine = WorkflowLifecycle::new(store.clone());
        engine.create(create_request("Night")).await.unwrap();

        store.set_unavailable(true);
        assert!(matches!(
            engine.delete("WF001", "ADM001").await,
            Err(DomainError::Internal(_))
        ));

        store.set_unavailable(false);
        assert!(store.find_workflow("WF001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_completed_for_patrol_groups_by_workflow() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        engine.create(create_request("Day")).await.unwrap();
        let night = add_checklist(&store, "WF001").await;
        add_checklist(&store, "WF002").await;
        complete_checklist(&store, night).await;
        engine.attempt_complete("WF001").await.unwrap();

        let grouped = engine.completed_for_patrol("PTR001").await.unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].workflow_id, "WF001");
        assert_eq!(grouped[0].checklists.len(), 1);

        assert!(engine.completed_for_patrol("PTR404").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_checklists_require_active_workflow() {
        let (store, engine) = setup().await;
        engine.create(create_request("Night")).await.unwrap();
        add_checklist(&store, "WF001").await;
        assert_eq!(engine.active_checklists("WF001").await.unwrap().len(), 1);

        engine
            .update(
                "WF001",
                UpdateWorkflowRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            engine.active_checklists("WF001").await,
            Err(DomainError::NotFound(_))
        ));
    }
}
