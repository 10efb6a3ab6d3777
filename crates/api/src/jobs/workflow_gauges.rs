//! Workflow status gauges.
//!
//! Publishes `workflows{status}` and `workflows_overdue`, where overdue means
//! in progress past its assigned end.

use chrono::{DateTime, Utc};
use domain::models::{Workflow, WorkflowStatus};
use domain::services::{EntityStore, WorkflowFilter};
use metrics::gauge;
use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};

#[derive(Debug, Default, PartialEq, Eq)]
struct WorkflowCounts {
    pending: usize,
    in_progress: usize,
    completed: usize,
    overdue: usize,
}

impl WorkflowCounts {
    fn tally(workflows: &[Workflow], now: DateTime<Utc>) -> Self {
        let mut counts = Self::default();
        for workflow in workflows {
            match workflow.status() {
                WorkflowStatus::Pending => counts.pending += 1,
                WorkflowStatus::Inprogress => {
                    counts.in_progress += 1;
                    if workflow.assigned_end.is_some_and(|end| end < now) {
                        counts.overdue += 1;
                    }
                }
                WorkflowStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}

pub struct WorkflowGaugesJob {
    store: Arc<dyn EntityStore>,
}

impl WorkflowGaugesJob {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl Job for WorkflowGaugesJob {
    fn name(&self) -> &'static str {
        "workflow_gauges"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(1)
    }

    async fn execute(&self) -> Result<(), String> {
        let workflows = self
            .store
            .list_workflows(&WorkflowFilter::default())
            .await
            .map_err(|e| e.to_string())?;

        let counts = WorkflowCounts::tally(&workflows, Utc::now());
        gauge!("workflows", "status" => "Pending").set(counts.pending as f64);
        gauge!("workflows", "status" => "Inprogress").set(counts.in_progress as f64);
        gauge!("workflows", "status" => "Completed").set(counts.completed as f64);
        gauge!("workflows_overdue").set(counts.overdue as f64);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::models::workflow::WorkflowFields;
    use domain::services::InMemoryEntityStore;

    fn workflow(id: &str, assigned_end: Option<DateTime<Utc>>) -> Workflow {
        let now = Utc::now();
        Workflow::new(WorkflowFields {
            workflow_id: id.into(),
            workflow_title: format!("Round {}", id),
            description: None,
            assigned_start: None,
            assigned_end,
            created_by: "ADM001".into(),
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
            version: 1,
        })
    }

    #[test]
    fn test_tally_counts_overdue_in_progress_only() {
        let now = Utc::now();
        let mut late = workflow("WF001", Some(now - Duration::hours(1)));
        late.start(now - Duration::hours(2), now).unwrap();
        let mut on_time = workflow("WF002", Some(now + Duration::hours(1)));
        on_time.start(now, now).unwrap();
        let pending_past_end = workflow("WF003", Some(now - Duration::hours(1)));

        let counts = WorkflowCounts::tally(&[late, on_time, pending_past_end], now);
        assert_eq!(
            counts,
            WorkflowCounts {
                pending: 1,
                in_progress: 2,
                completed: 0,
                overdue: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_execute_against_store() {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        store.insert_workflow(&workflow("WF001", None)).await.unwrap();

        let job = WorkflowGaugesJob::new(store);
        assert_eq!(job.name(), "workflow_gauges");
        assert!(job.execute().await.is_ok());
    }
}
