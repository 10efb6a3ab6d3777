//! Incident catalog and incident repository.

use domain::models::{Incident, IncidentMaster};
use sqlx::PgPool;

use crate::entities::{IncidentMasterEntity, SeverityDb};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct IncidentRepository {
    pool: PgPool,
}

impl IncidentRepository {
    /// Creates a new IncidentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert_master(&self, master: &IncidentMaster) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_incident_master");
        let result = sqlx::query(
            r#"
            INSERT INTO incident_masters (code, incident, severity, created_date, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&master.code)
        .bind(&master.incident)
        .bind(SeverityDb::from(master.severity))
        .bind(master.created_date)
        .bind(master.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_master(
        &self,
        code: &str,
    ) -> Result<Option<IncidentMasterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_incident_master");
        let result = sqlx::query_as::<_, IncidentMasterEntity>(
            r#"
            SELECT code, incident, severity, created_date, is_active
            FROM incident_masters
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_masters(
        &self,
        codes: &[String],
    ) -> Result<Vec<IncidentMasterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_incident_masters");
        let result = sqlx::query_as::<_, IncidentMasterEntity>(
            r#"
            SELECT code, incident, severity, created_date, is_active
            FROM incident_masters
            WHERE code = ANY($1)
            ORDER BY code ASC
            "#,
        )
        .bind(codes)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_masters(&self) -> Result<Vec<IncidentMasterEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_incident_masters");
        let result = sqlx::query_as::<_, IncidentMasterEntity>(
            r#"
            SELECT code, incident, severity, created_date, is_active
            FROM incident_masters
            ORDER BY created_date ASC, code ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns the number of rows affected (0 if the code is unknown).
    pub async fn update_master(&self, master: &IncidentMaster) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_incident_master");
        let result = sqlx::query(
            r#"
            UPDATE incident_masters
            SET incident = $2, severity = $3, is_active = $4
            WHERE code = $1
            "#,
        )
        .bind(&master.code)
        .bind(&master.incident)
        .bind(SeverityDb::from(master.severity))
        .bind(master.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Inserts every incident in one transaction.
    pub async fn insert_incidents(&self, incidents: &[Incident]) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_incidents");
        let mut tx = self.pool.begin().await?;
        for incident in incidents {
            sqlx::query(
                r#"
                INSERT INTO incidents (id, incident_name, severity, incident_type, patrol_id, date, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(incident.id)
            .bind(&incident.incident_name)
            .bind(SeverityDb::from(incident.severity))
            .bind(&incident.incident_type)
            .bind(&incident.patrol_id)
            .bind(incident.date)
            .bind(incident.is_active)
            .execute(&mut *tx)
            .await?;
        }
        let result = tx.commit().await;
        timer.record();
        result
    }
}
