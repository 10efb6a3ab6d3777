//! Reporting aggregator.
//!
//! Read-only fan-out over the store: completed workflows joined with a
//! patrol's checklists and the attachments recorded against them.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::store::{AttachmentScope, ChecklistFilter, EntityStore, WorkflowFilter};
use crate::error::{DomainError, DomainResult};
use crate::models::report::{ChecklistReport, MediaReport, RegularReport, WorkflowReport};
use crate::models::{Checklist, WorkflowStatus};
use shared::validation::{end_of_day, parse_instant, start_of_day};

/// Bounds on a workflow's actual start, all in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ReportWindow {
    /// Both bounds: whole days `[start 00:00:00, end 23:59:59.999]`.
    /// Start only: `[start, now]`. End only: `(-inf, end]`.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let start = parse_bound(start, "startDateTime")?;
        let end = parse_bound(end, "endDateTime")?;

        Ok(match (start, end) {
            (Some(start), Some(end)) => Self {
                from: Some(start_of_day(start)),
                to: Some(end_of_day(end)),
            },
            (Some(start), None) => Self {
                from: Some(start),
                to: Some(now),
            },
            (None, Some(end)) => Self {
                from: None,
                to: Some(end),
            },
            (None, None) => Self::default(),
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// A bounded window never admits a workflow that was never started.
    pub fn admits(&self, started_at: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        match started_at {
            Some(at) => {
                self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
            }
            None => false,
        }
    }
}

fn parse_bound(value: Option<&str>, field: &str) -> DomainResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_instant(raw)
            .map(Some)
            .ok_or_else(|| {
                DomainError::Validation(format!("{} is not a valid date: {}", field, raw))
            }),
    }
}

pub struct ReportingService {
    store: Arc<dyn EntityStore>,
}

impl ReportingService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Completed workflows in `window` with the patrol's checklists and their
    /// media and signatures. Workflows the patrol had no checklist in are
    /// omitted.
    pub async fn regular_report(
        &self,
        patrol_id: &str,
        window: ReportWindow,
    ) -> DomainResult<RegularReport> {
        let workflows: Vec<_> = self
            .store
            .list_workflows(&WorkflowFilter {
                status: Some(WorkflowStatus::Completed),
                ..Default::default()
            })
            .await?
            .into_iter()
            .filter(|w| window.admits(w.start_date_time()))
            .collect();
        if workflows.is_empty() {
            return Err(DomainError::NotFound(
                "No matching workflows found for given criteria".to_string(),
            ));
        }

        let filter = ChecklistFilter {
            workflow_ids: Some(workflows.iter().map(|w| w.workflow_id.clone()).collect()),
            ..ChecklistFilter::for_patrol(patrol_id)
        };
        let checklists = self.store.list_checklists(&filter).await?;

        // Attachments are loaded once per patrol and matched in memory.
        let media = self.store.list_media(patrol_id, AttachmentScope::All).await?;
        let signatures = self
            .store
            .list_signatures(patrol_id, AttachmentScope::All)
            .await?;

        let attach = |checklist: &Checklist| ChecklistReport {
            multimedia: media
                .iter()
                .filter(|m| m.checklist_id.as_deref() == Some(checklist.checklist_id.as_str()))
                .cloned()
                .collect(),
            signatures: signatures
                .iter()
                .filter(|s| s.checklist_id.as_deref() == Some(checklist.checklist_id.as_str()))
                .cloned()
                .collect(),
            checklist: checklist.clone(),
        };

        let reports: Vec<WorkflowReport> = workflows
            .into_iter()
            .filter_map(|workflow| {
                let own: Vec<ChecklistReport> = checklists
                    .iter()
                    .filter(|c| c.workflow_id == workflow.workflow_id)
                    .map(&attach)
                    .collect();
                (!own.is_empty()).then_some(WorkflowReport {
                    workflow,
                    checklists: own,
                })
            })
            .collect();

        debug!(patrol_id = %patrol_id, workflows = reports.len(), "Regular report built");
        Ok(RegularReport {
            patrol_id: patrol_id.to_string(),
            workflows: reports,
        })
    }

    /// General attachments of a patrol, not linked to any checklist.
    pub async fn media_report(&self, patrol_id: &str) -> DomainResult<MediaReport> {
        let multimedia = self
            .store
            .list_media(patrol_id, AttachmentScope::General)
            .await?;
        let signatures = self
            .store
            .list_signatures(patrol_id, AttachmentScope::General)
            .await?;
        if multimedia.is_empty() && signatures.is_empty() {
            return Err(DomainError::NotFound(format!(
                "No general media or signatures found for patrol {}",
                patrol_id
            )));
        }

        Ok(MediaReport {
            patrol_id: patrol_id.to_string(),
            multimedia,
            signatures,
        })
    }
}
