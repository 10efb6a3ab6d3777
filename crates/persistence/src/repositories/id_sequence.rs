//! Per-family identifier counters.

use domain::models::IdFamily;
use sqlx::PgPool;

use crate::metrics::QueryTimer;

/// Table and column holding the identifiers of `family`.
fn id_source(family: IdFamily) -> (&'static str, &'static str) {
    match family {
        IdFamily::Company => ("companies", "company_code"),
        IdFamily::Location => ("locations", "location_id"),
        IdFamily::Admin => ("users", "admin_id"),
        IdFamily::Patrol => ("users", "patrol_id"),
        IdFamily::Workflow => ("workflows", "workflow_id"),
        IdFamily::Checklist => ("checklists", "checklist_id"),
        IdFamily::Scan => ("scans", "scan_id"),
        IdFamily::Signature => ("signatures", "signature_id"),
        IdFamily::Media => ("media", "multimedia_id"),
        IdFamily::History => ("history", "history_id"),
    }
}

/// Advances a family counter in a single statement.
///
/// The upsert takes a row lock on the family's counter, so concurrent
/// callers are serialized and never receive the same value. The counter is
/// raised past the highest well-formed identifier already stored, which
/// keeps it ahead of rows inserted before the counter existed.
pub fn next_value_sql(family: IdFamily) -> String {
    let (table, column) = id_source(family);
    format!(
        r#"
        WITH highest AS (
            SELECT COALESCE(MAX(CAST(SUBSTRING({column} FROM '^{prefix}([0-9]+)$') AS BIGINT)), 0) AS value
            FROM {table}
        )
        INSERT INTO id_sequences (family, value)
        SELECT $1, highest.value + 1 FROM highest
        ON CONFLICT (family) DO UPDATE
            SET value = GREATEST(id_sequences.value, EXCLUDED.value - 1) + 1
        RETURNING value
        "#,
        column = column,
        table = table,
        prefix = family.prefix(),
    )
}

#[derive(Clone)]
pub struct IdSequenceRepository {
    pool: PgPool,
}

impl IdSequenceRepository {
    /// Creates a new IdSequenceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the next numeric suffix for `family`.
    pub async fn next_value(&self, family: IdFamily) -> Result<i64, sqlx::Error> {
        let sql = next_value_sql(family);
        let timer = QueryTimer::new("next_id");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(&sql)
            .bind(family.prefix())
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result.map(|row| row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_family_has_a_source() {
        for family in IdFamily::ALL {
            let (table, column) = id_source(family);
            assert!(!table.is_empty());
            assert!(!column.is_empty());
        }
    }

    #[test]
    fn test_sql_scans_family_column() {
        let sql = next_value_sql(IdFamily::Patrol);
        assert!(sql.contains("SUBSTRING(patrol_id FROM '^PTR([0-9]+)$')"));
        assert!(sql.contains("FROM users"));
        assert!(sql.contains("GREATEST(id_sequences.value"));
    }
}
