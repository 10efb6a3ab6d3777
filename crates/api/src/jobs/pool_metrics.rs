//! Publishes connection pool gauges for the Postgres store.

use sqlx::PgPool;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};

pub struct PoolMetricsJob {
    pool: PgPool,
}

impl PoolMetricsJob {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Job for PoolMetricsJob {
    fn name(&self) -> &'static str {
        "pool_metrics"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Seconds(15)
    }

    async fn execute(&self) -> Result<(), String> {
        let snapshot = persistence::metrics::record_pool_metrics(&self.pool);
        debug!(
            size = snapshot.size,
            idle = snapshot.idle,
            active = snapshot.active(),
            "Pool metrics recorded"
        );
        Ok(())
    }
}
