//! Query and pool instrumentation for the Postgres store.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records one finished query under its repository name.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    let query = query_name.to_string();
    counter!("database_queries_total", "query" => query.clone()).increment(1);
    histogram!("database_query_duration_seconds", "query" => query).record(duration_secs);
}

/// Snapshot of the pool, also published as gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub size: u32,
    pub idle: usize,
}

impl PoolSnapshot {
    pub fn active(&self) -> usize {
        (self.size as usize).saturating_sub(self.idle)
    }
}

pub fn record_pool_metrics(pool: &PgPool) -> PoolSnapshot {
    let snapshot = PoolSnapshot {
        size: pool.size(),
        idle: pool.num_idle(),
    };

    gauge!("database_connections_active").set(snapshot.active() as f64);
    gauge!("database_connections_idle").set(snapshot.idle as f64);
    gauge!("database_connections_total").set(snapshot.size as f64);
    snapshot
}

/// Times a repository call; `record` publishes the elapsed time.
///
/// ```ignore
/// let timer = QueryTimer::new("find_workflow");
/// let row = sqlx::query_as::<_, WorkflowEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("list_checklists");
        assert_eq!(timer.query_name, "list_checklists");
    }

    #[test]
    fn test_record_without_recorder_is_noop() {
        QueryTimer::new("next_id").record();
        record_query_duration("count_checklists", 0.002);
    }

    #[test]
    fn test_pool_snapshot_active() {
        let snapshot = PoolSnapshot { size: 5, idle: 2 };
        assert_eq!(snapshot.active(), 3);

        let drained = PoolSnapshot { size: 1, idle: 4 };
        assert_eq!(drained.active(), 0);
    }
}
