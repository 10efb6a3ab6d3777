//! Workflow repository for database operations.

use domain::models::Workflow;
use domain::services::WorkflowFilter;
use sqlx::PgPool;

use crate::entities::{WorkflowEntity, WorkflowStateColumns, WorkflowStatusDb};
use crate::metrics::QueryTimer;

/// Repository for workflow rows.
///
/// Updates are optimistic: a write only lands when the stored version
/// still equals the version the caller read.
#[derive(Clone)]
pub struct WorkflowRepository {
    pool: PgPool,
}

impl WorkflowRepository {
    /// Creates a new WorkflowRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert(&self, workflow: &Workflow) -> Result<(), sqlx::Error> {
        let state = WorkflowStateColumns::from(workflow.state());
        let timer = QueryTimer::new("insert_workflow");
        let result = sqlx::query(
            r#"
            INSERT INTO workflows (workflow_id, workflow_title, description, status, workflow_status,
                                   assigned_start, assigned_end, start_date_time, end_date_time,
                                   created_by, modified_by, created_date, modified_date, is_active, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(&workflow.workflow_id)
        .bind(&workflow.workflow_title)
        .bind(&workflow.description)
        .bind(state.status)
        .bind(state.workflow_status)
        .bind(workflow.assigned_start)
        .bind(workflow.assigned_end)
        .bind(state.start_date_time)
        .bind(state.end_date_time)
        .bind(&workflow.created_by)
        .bind(&workflow.modified_by)
        .bind(workflow.created_date)
        .bind(workflow.modified_date)
        .bind(workflow.is_active)
        .bind(workflow.version)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(
        &self,
        workflow_id: &str,
    ) -> Result<Option<WorkflowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_workflow");
        let result = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            SELECT workflow_id, workflow_title, description, status, workflow_status,
                   assigned_start, assigned_end, start_date_time, end_date_time,
                   created_by, modified_by, created_date, modified_date, is_active, version
            FROM workflows
            WHERE workflow_id = $1
            "#,
        )
        .bind(workflow_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_title(&self, title: &str) -> Result<Option<WorkflowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_workflow_by_title");
        let result = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            SELECT workflow_id, workflow_title, description, status, workflow_status,
                   assigned_start, assigned_end, start_date_time, end_date_time,
                   created_by, modified_by, created_date, modified_date, is_active, version
            FROM workflows
            WHERE workflow_title = $1
            "#,
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List workflows matching `filter`, oldest first.
    pub async fn list(&self, filter: &WorkflowFilter) -> Result<Vec<WorkflowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_workflows");
        let result = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            SELECT workflow_id, workflow_title, description, status, workflow_status,
                   assigned_start, assigned_end, start_date_time, end_date_time,
                   created_by, modified_by, created_date, modified_date, is_active, version
            FROM workflows
            WHERE ($1::workflow_status IS NULL OR status = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
            ORDER BY created_date ASC, workflow_id ASC
            "#,
        )
        .bind(filter.status.map(WorkflowStatusDb::from))
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Version-checked update. Returns `None` when the row is missing or
    /// its version moved on.
    pub async fn update_versioned(
        &self,
        workflow: &Workflow,
    ) -> Result<Option<WorkflowEntity>, sqlx::Error> {
        let state = WorkflowStateColumns::from(workflow.state());
        let timer = QueryTimer::new("update_workflow");
        let result = sqlx::query_as::<_, WorkflowEntity>(
            r#"
            UPDATE workflows
            SET workflow_title = $3, description = $4, status = $5, workflow_status = $6,
                assigned_start = $7, assigned_end = $8, start_date_time = $9, end_date_time = $10,
                modified_by = $11, modified_date = $12, is_active = $13, version = version + 1
            WHERE workflow_id = $1 AND version = $2
            RETURNING workflow_id, workflow_title, description, status, workflow_status,
                      assigned_start, assigned_end, start_date_time, end_date_time,
                      created_by, modified_by, created_date, modified_date, is_active, version
            "#,
        )
        .bind(&workflow.workflow_id)
        .bind(workflow.version)
        .bind(&workflow.workflow_title)
        .bind(&workflow.description)
        .bind(state.status)
        .bind(state.workflow_status)
        .bind(workflow.assigned_start)
        .bind(workflow.assigned_end)
        .bind(state.start_date_time)
        .bind(state.end_date_time)
        .bind(&workflow.modified_by)
        .bind(workflow.modified_date)
        .bind(workflow.is_active)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Hard delete. Checklists of the workflow are left in place.
    pub async fn delete(&self, workflow_id: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_workflow");
        let result = sqlx::query("DELETE FROM workflows WHERE workflow_id = $1")
            .bind(workflow_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
