//! Metrics module
//!
//! Prometheus export plus the database and connection-pool metrics.
//! RPC request metrics are recorded by the transport server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use catalog_adapter_postgres::PoolStatus;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusHandle};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::infrastructure::Infrastructure;

/// Metrics recorder
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// Install the global Prometheus recorder
    ///
    /// Fails if a recorder is already installed in this process.
    pub fn new() -> Result<Self, BuildError> {
        let handle = catalog_telemetry::init_metrics()?;
        Ok(Self { handle })
    }

    /// Render the Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Record a database query
pub fn record_db_query(operation: &str, table: &str, duration_ms: f64, success: bool) {
    let labels = [
        ("operation", operation.to_string()),
        ("table", table.to_string()),
        ("success", success.to_string()),
    ];

    counter!("db_queries_total", &labels).increment(1);
    histogram!("db_query_duration_ms", &labels).record(duration_ms);
}

/// Database query timer
pub struct DbQueryTimer {
    start: Instant,
    operation: &'static str,
    table: &'static str,
}

impl DbQueryTimer {
    pub fn new(operation: &'static str, table: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
            table,
        }
    }

    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_db_query(self.operation, self.table, duration, success);
    }
}

/// Periodically samples the PostgreSQL pool
pub struct PoolMetricsCollector {
    infra: Arc<Infrastructure>,
    interval: Duration,
}

impl PoolMetricsCollector {
    pub fn new(infra: Arc<Infrastructure>, interval: Duration) -> Self {
        Self { infra, interval }
    }

    /// Sample every 15 seconds
    pub fn with_default_interval(infra: Arc<Infrastructure>) -> Self {
        Self::new(infra, Duration::from_secs(15))
    }

    /// Spawn the sampling task; it ends when `shutdown` is cancelled
    pub fn start(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let status = self.infra.postgres_pool_status();
                        record_postgres_pool_metrics(&status);
                        debug!(
                            size = status.size,
                            idle = status.idle,
                            active = status.active,
                            "Pool metrics collected"
                        );
                    }
                }
            }
        })
    }
}

/// Percentage of pool connections in use
pub fn pool_utilization(status: &PoolStatus) -> f64 {
    if status.size == 0 {
        return 0.0;
    }
    (status.active as f64 / status.size as f64) * 100.0
}

pub fn record_postgres_pool_metrics(status: &PoolStatus) {
    gauge!("postgres_pool_size").set(status.size as f64);
    gauge!("postgres_pool_idle").set(status.idle as f64);
    gauge!("postgres_pool_active").set(status.active as f64);
    gauge!("postgres_pool_utilization").set(pool_utilization(status));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_utilization() {
        let status = PoolStatus {
            size: 10,
            idle: 6,
            active: 4,
        };
        assert_eq!(pool_utilization(&status), 40.0);
    }

    #[test]
    fn test_empty_pool_utilization() {
        let status = PoolStatus {
            size: 0,
            idle: 0,
            active: 0,
        };
        assert_eq!(pool_utilization(&status), 0.0);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_db_query("select", "products", 1.5, true);
        DbQueryTimer::new("insert", "products").finish(false);
    }
}
