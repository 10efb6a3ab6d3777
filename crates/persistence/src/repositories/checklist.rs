//! Checklist repository for database operations.

use domain::models::Checklist;
use domain::services::ChecklistFilter;
use sqlx::{PgConnection, PgPool};

use crate::entities::{ChecklistEntity, ChecklistStatusDb};
use crate::metrics::QueryTimer;

/// Repository for checklist rows.
#[derive(Clone)]
pub struct ChecklistRepository {
    pool: PgPool,
}

impl ChecklistRepository {
    /// Creates a new ChecklistRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert(&self, checklist: &Checklist) -> Result<(), sqlx::Error> {
        let status = ChecklistStatusDb::from(checklist.status());
        let timer = QueryTimer::new("insert_checklist");
        let result = sqlx::query(
            r#"
            INSERT INTO checklists (checklist_id, workflow_id, location_code, title, remarks, status,
                                    assigned_to, assigned_by, start_date_time, end_date_time,
                                    created_by, modified_by, created_date, modified_date, is_active,
                                    scan_start_date, scan_end_date, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(&checklist.checklist_id)
        .bind(&checklist.workflow_id)
        .bind(&checklist.location_code)
        .bind(&checklist.title)
        .bind(&checklist.remarks)
        .bind(status)
        .bind(checklist.assigned_to())
        .bind(checklist.assigned_by())
        .bind(checklist.start_date_time)
        .bind(checklist.end_date_time)
        .bind(&checklist.created_by)
        .bind(&checklist.modified_by)
        .bind(checklist.created_date)
        .bind(checklist.modified_date)
        .bind(checklist.is_active)
        .bind(checklist.scan_start_date)
        .bind(checklist.scan_end_date)
        .bind(checklist.version)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(
        &self,
        checklist_id: &str,
    ) -> Result<Option<ChecklistEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_checklist");
        let result = sqlx::query_as::<_, ChecklistEntity>(
            r#"
            SELECT checklist_id, workflow_id, location_code, title, remarks, status,
                   assigned_to, assigned_by, start_date_time, end_date_time,
                   created_by, modified_by, created_date, modified_date, is_active,
                   scan_start_date, scan_end_date, version
            FROM checklists
            WHERE checklist_id = $1
            "#,
        )
        .bind(checklist_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_ids(
        &self,
        checklist_ids: &[String],
    ) -> Result<Vec<ChecklistEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_checklists");
        let result = sqlx::query_as::<_, ChecklistEntity>(
            r#"
            SELECT checklist_id, workflow_id, location_code, title, remarks, status,
                   assigned_to, assigned_by, start_date_time, end_date_time,
                   created_by, modified_by, created_date, modified_date, is_active,
                   scan_start_date, scan_end_date, version
            FROM checklists
            WHERE checklist_id = ANY($1)
            ORDER BY created_date ASC, checklist_id ASC
            "#,
        )
        .bind(checklist_ids)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List checklists matching `filter`, oldest first.
    pub async fn list(
        &self,
        filter: &ChecklistFilter,
    ) -> Result<Vec<ChecklistEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_checklists");
        let result = sqlx::query_as::<_, ChecklistEntity>(
            r#"
            SELECT checklist_id, workflow_id, location_code, title, remarks, status,
                   assigned_to, assigned_by, start_date_time, end_date_time,
                   created_by, modified_by, created_date, modified_date, is_active,
                   scan_start_date, scan_end_date, version
            FROM checklists
            WHERE ($1::text IS NULL OR workflow_id = $1)
              AND ($2::text[] IS NULL OR workflow_id = ANY($2))
              AND ($3::text IS NULL OR assigned_to = $3)
              AND ($4::checklist_status IS NULL OR status = $4)
              AND ($5::boolean IS NULL OR is_active = $5)
            ORDER BY created_date ASC, checklist_id ASC
            "#,
        )
        .bind(filter.workflow_id.as_deref())
        .bind(filter.workflow_ids.as_deref())
        .bind(filter.assigned_to.as_deref())
        .bind(filter.status.map(ChecklistStatusDb::from))
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_by_workflow(&self, workflow_id: &str) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_checklists");
        let result: Result<(i64,), sqlx::Error> =
            sqlx::query_as("SELECT COUNT(*) FROM checklists WHERE workflow_id = $1")
                .bind(workflow_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result.map(|count| count.0)
    }

    /// Version-checked update on an explicit connection so batches can share
    /// one transaction. Returns `None` when the row is missing or stale.
    pub async fn update_versioned(
        conn: &mut PgConnection,
        checklist: &Checklist,
    ) -> Result<Option<ChecklistEntity>, sqlx::Error> {
        let status = ChecklistStatusDb::from(checklist.status());
        let timer = QueryTimer::new("update_checklist");
        let result = sqlx::query_as::<_, ChecklistEntity>(
            r#"
            UPDATE checklists
            SET title = $3, remarks = $4, status = $5, assigned_to = $6, assigned_by = $7,
                start_date_time = $8, end_date_time = $9, modified_by = $10, modified_date = $11,
                is_active = $12, scan_start_date = $13, scan_end_date = $14, version = version + 1
            WHERE checklist_id = $1 AND version = $2
            RETURNING checklist_id, workflow_id, location_code, title, remarks, status,
                      assigned_to, assigned_by, start_date_time, end_date_time,
                      created_by, modified_by, created_date, modified_date, is_active,
                      scan_start_date, scan_end_date, version
            "#,
        )
        .bind(&checklist.checklist_id)
        .bind(checklist.version)
        .bind(&checklist.title)
        .bind(&checklist.remarks)
        .bind(status)
        .bind(checklist.assigned_to())
        .bind(checklist.assigned_by())
        .bind(checklist.start_date_time)
        .bind(checklist.end_date_time)
        .bind(&checklist.modified_by)
        .bind(checklist.modified_date)
        .bind(checklist.is_active)
        .bind(checklist.scan_start_date)
        .bind(checklist.scan_end_date)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }
}
