//! Checklist lifecycle engine.
//!
//! Checklists move `Unassigned -> Open -> Completed`. Field edits are locked
//! outside `Open`; scans only need an active checklist.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use super::directory::{require_admin, require_admin_or_patrol, require_patrol};
use super::store::{ChecklistFilter, EntityStore, StoreError};
use crate::error::{DomainError, DomainResult};
use crate::models::checklist::{
    AssignChecklistsRequest, AssignedChecklistsQuery, BulkCompletion, ChecklistFields,
    CreateChecklistRequest, UpdateChecklistRequest, WorkflowChecklists,
};
use crate::models::scan::RecordScanRequest;
use crate::models::{Checklist, ChecklistStatus, IdFamily, Scan, ScanStatus, ScanType};

/// Reads of a checklist before a scan stamp gives up on concurrent writers.
const SCAN_STAMP_ATTEMPTS: u32 = 3;

pub struct ChecklistLifecycle {
    store: Arc<dyn EntityStore>,
}

impl ChecklistLifecycle {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    async fn load(&self, checklist_id: &str) -> DomainResult<Checklist> {
        self.store
            .find_checklist(checklist_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Checklist {}", checklist_id)))
    }

    pub async fn create(&self, request: CreateChecklistRequest) -> DomainResult<Checklist> {
        request.validate()?;

        if self.store.find_workflow(&request.workflow_id).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "Workflow {}",
                request.workflow_id
            )));
        }
        if self
            .store
            .find_location_by_code(&request.location_code)
            .await?
            .is_none()
        {
            return Err(DomainError::not_found(format!(
                "Location {}",
                request.location_code
            )));
        }
        require_admin_or_patrol(self.store.as_ref(), &request.created_by).await?;

        let now = Utc::now();
        let checklist = Checklist::new(ChecklistFields {
            checklist_id: self.store.next_id(IdFamily::Checklist).await?,
            workflow_id: request.workflow_id,
            location_code: request.location_code,
            title: request.title,
            remarks: request.remarks,
            start_date_time: request.start_date_time,
            end_date_time: request.end_date_time,
            created_by: request.created_by,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: request.is_active.unwrap_or(true),
            scan_start_date: None,
            scan_end_date: None,
            version: 0,
        });
        self.store.insert_checklist(&checklist).await?;

        info!(
            checklist_id = %checklist.checklist_id,
            workflow_id = %checklist.workflow_id,
            "Checklist created"
        );
        Ok(checklist)
    }

    pub async fn get(&self, checklist_id: &str) -> DomainResult<Checklist> {
        self.load(checklist_id).await
    }

    pub async fn by_workflow(&self, workflow_id: &str) -> DomainResult<Vec<Checklist>> {
        Ok(self
            .store
            .list_checklists(&ChecklistFilter::for_workflow(workflow_id))
            .await?)
    }

    /// Opens every listed checklist for `assigned_to`, or none of them.
    pub async fn bulk_assign(
        &self,
        request: AssignChecklistsRequest,
    ) -> DomainResult<Vec<Checklist>> {
        request.validate()?;
        require_patrol(self.store.as_ref(), &request.assigned_to).await?;
        require_admin(self.store.as_ref(), &request.assigned_by).await?;

        let found = self.store.find_checklists(&request.checklist_ids).await?;
        let missing: Vec<&str> = request
            .checklist_ids
            .iter()
            .filter(|id| !found.iter().any(|c| &c.checklist_id == *id))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::NotFound(format!(
                "Checklists not found: {}",
                missing.join(", ")
            )));
        }

        let now = Utc::now();
        let mut batch = Vec::with_capacity(found.len());
        for mut checklist in found {
            checklist.assign(&request.assigned_to, &request.assigned_by, now)?;
            batch.push(checklist);
        }
        let stored = self.store.update_checklists(&batch).await?;

        info!(
            count = stored.len(),
            assigned_to = %request.assigned_to,
            assigned_by = %request.assigned_by,
            "Checklists assigned"
        );
        Ok(stored)
    }

    /// Edits an `Open` checklist on behalf of an admin.
    pub async fn update(
        &self,
        checklist_id: &str,
        request: UpdateChecklistRequest,
    ) -> DomainResult<Checklist> {
        let mut checklist = self.load(checklist_id).await?;
        checklist.ensure_editable()?;
        request.validate()?;

        let modified_by = request
            .modified_by
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DomainError::Validation("modifiedBy is required".to_string()))?;
        require_admin(self.store.as_ref(), modified_by).await?;

        let now = Utc::now();
        if request.assigned_to.is_some() || request.assigned_by.is_some() {
            let assigned_to = request
                .assigned_to
                .as_deref()
                .or(checklist.assigned_to())
                .unwrap_or_default()
                .to_string();
            let assigned_by = request
                .assigned_by
                .as_deref()
                .or(checklist.assigned_by())
                .unwrap_or_default()
                .to_string();
            if Some(assigned_to.as_str()) != checklist.assigned_to() {
                require_patrol(self.store.as_ref(), &assigned_to).await?;
            }
            if Some(assigned_by.as_str()) != checklist.assigned_by() {
                require_admin(self.store.as_ref(), &assigned_by).await?;
            }
            checklist.assign(&assigned_to, &assigned_by, now)?;
        }

        if let Some(title) = request.title {
            checklist.title = title;
        }
        if let Some(remarks) = request.remarks {
            checklist.remarks = Some(remarks);
        }
        if let Some(is_active) = request.is_active {
            checklist.is_active = is_active;
        }
        checklist.modified_by = Some(modified_by.to_string());
        checklist.modified_date = now;

        let stored = self.store.update_checklist(&checklist).await?;
        info!(checklist_id = %checklist_id, modified_by = %modified_by, "Checklist updated");
        Ok(stored)
    }

    /// Records a successful scan and stamps the checklist's scan start.
    pub async fn record_scan_start(
        &self,
        request: RecordScanRequest,
        created_by: Option<String>,
    ) -> DomainResult<Scan> {
        request.validate()?;
        let scan_type = ScanType::from_str(&request.scan_type).map_err(DomainError::Validation)?;

        // Stamp first: a scan is only stored once its checklist carries the stamp.
        let now = Utc::now();
        let checklist = self.stamp_scan_start(&request.checklist_id, now).await?;

        let scan = Scan {
            scan_id: self.store.next_id(IdFamily::Scan).await?,
            scan_type,
            checklist_id: checklist.checklist_id.clone(),
            scan_start_date: now,
            status: ScanStatus::Success,
            created_by,
            created_date: now,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_scan(&scan).await?;

        info!(
            scan_id = %scan.scan_id,
            checklist_id = %scan.checklist_id,
            scan_type = scan.scan_type.as_str(),
            "Scan recorded"
        );
        Ok(scan)
    }

    /// Sets `scanStartDate` on an active checklist, re-reading it when a
    /// concurrent write bumps its version.
    async fn stamp_scan_start(
        &self,
        checklist_id: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Checklist> {
        let mut attempt = 1;
        loop {
            let mut checklist = self.load(checklist_id).await?;
            if !checklist.is_active {
                return Err(DomainError::NotFound(format!(
                    "Checklist {} is not active",
                    checklist_id
                )));
            }
            checklist.scan_start_date = Some(at);
            checklist.modified_date = at;

            match self.store.update_checklist(&checklist).await {
                Ok(stored) => return Ok(stored),
                Err(StoreError::VersionConflict { .. }) if attempt < SCAN_STAMP_ATTEMPTS => {
                    warn!(
                        checklist_id = %checklist_id,
                        attempt,
                        "Checklist changed before scan stamp, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Stamps the scan end. No state precondition.
    pub async fn record_scan_end(
        &self,
        checklist_id: &str,
        modified_by: Option<String>,
    ) -> DomainResult<Checklist> {
        let mut checklist = self.load(checklist_id).await?;
        let now = Utc::now();
        checklist.scan_end_date = Some(now);
        checklist.modified_date = now;
        if modified_by.is_some() {
            checklist.modified_by = modified_by;
        }

        let stored = self.store.update_checklist(&checklist).await?;
        info!(checklist_id = %checklist_id, "Scan end recorded");
        Ok(stored)
    }

    /// Completes every listed checklist that is `Open`.
    ///
    /// Each checklist is re-read and written on its own; ids that are missing,
    /// not `Open`, or lost a concurrent write are reported as skipped.
    pub async fn bulk_complete(&self, checklist_ids: &[String]) -> DomainResult<BulkCompletion> {
        if checklist_ids.is_empty() {
            return Err(DomainError::Validation(
                "checklistIds must contain at least one id".to_string(),
            ));
        }

        let mut outcome = BulkCompletion::default();
        for checklist_id in checklist_ids {
            let Some(mut checklist) = self.store.find_checklist(checklist_id).await? else {
                outcome.skipped.push(checklist_id.clone());
                continue;
            };
            if checklist.complete(Utc::now()).is_err() {
                outcome.skipped.push(checklist_id.clone());
                continue;
            }

            match self.store.update_checklist(&checklist).await {
                Ok(_) => outcome.completed.push(checklist_id.clone()),
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(
                        checklist_id = %checklist_id,
                        "Checklist changed during completion, skipped"
                    );
                    outcome.skipped.push(checklist_id.clone());
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            completed = outcome.completed.len(),
            skipped = outcome.skipped.len(),
            "Checklists completed"
        );
        Ok(outcome)
    }

    pub async fn assigned(&self, query: AssignedChecklistsQuery) -> DomainResult<Vec<Checklist>> {
        let filter = ChecklistFilter {
            status: query.status,
            is_active: query.is_active,
            ..ChecklistFilter::for_patrol(&query.assigned_to)
        };
        Ok(self.store.list_checklists(&filter).await?)
    }

    /// Open checklists of one workflow assigned to one patrol.
    pub async fn open_for(
        &self,
        workflow_id: &str,
        patrol_id: &str,
    ) -> DomainResult<Vec<Checklist>> {
        let filter = ChecklistFilter {
            workflow_id: Some(workflow_id.to_string()),
            status: Some(ChecklistStatus::Open),
            ..ChecklistFilter::for_patrol(patrol_id)
        };
        Ok(self.store.list_checklists(&filter).await?)
    }

    /// A patrol's checklists grouped by workflow, in workflow id order.
    pub async fn grouped_for_patrol(
        &self,
        patrol_id: &str,
    ) -> DomainResult<Vec<WorkflowChecklists>> {
        let checklists = self
            .store
            .list_checklists(&ChecklistFilter::for_patrol(patrol_id))
            .await?;

        let mut groups: BTreeMap<String, Vec<Checklist>> = BTreeMap::new();
        for checklist in checklists {
            groups
                .entry(checklist.workflow_id.clone())
                .or_default()
                .push(checklist);
        }

        let mut grouped = Vec::with_capacity(groups.len());
        for (workflow_id, checklists) in groups {
            let workflow_title = self
                .store
                .find_workflow(&workflow_id)
                .await?
                .map(|w| w.workflow_title);
            grouped.push(WorkflowChecklists {
                workflow_id,
                workflow_title,
                checklists,
            });
        }
        Ok(grouped)
    }
}
