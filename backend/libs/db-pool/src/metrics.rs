//! Pool gauges and acquire latency for the wall database

use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use sqlx::{pool::PoolConnection, PgPool, Postgres};
use std::time::Instant;

lazy_static::lazy_static! {
    static ref POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "wall_db_pool_connections",
        "Connections in the pool by state (idle, in_use, max)",
        &["service", "state"]
    ).expect("Prometheus metrics registration should succeed at startup");

    static ref POOL_ACQUIRE_SECONDS: HistogramVec = register_histogram_vec!(
        "wall_db_pool_acquire_seconds",
        "Latency of readiness-path connection acquires",
        &["service"],
        vec![0.001, 0.005, 0.025, 0.1, 0.5, 2.0, 10.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    static ref POOL_ACQUIRE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "wall_db_pool_acquire_failures_total",
        "Failed connection acquires by cause",
        &["service", "cause"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Snapshot of pool occupancy as gauge values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PoolOccupancy {
    pub idle: i64,
    pub in_use: i64,
    pub max: i64,
}

impl PoolOccupancy {
    pub(crate) fn new(size: u32, idle: usize, max: u32) -> Self {
        let idle = idle as i64;
        Self {
            idle,
            in_use: (size as i64 - idle).max(0),
            max: max as i64,
        }
    }
}

/// Label for an acquire failure
fn failure_cause(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut => "timeout",
        sqlx::Error::PoolClosed => "closed",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "network",
        _ => "other",
    }
}

pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    let occupancy = PoolOccupancy::new(
        pool.size(),
        pool.num_idle(),
        pool.options().get_max_connections(),
    );

    for (state, value) in [
        ("idle", occupancy.idle),
        ("in_use", occupancy.in_use),
        ("max", occupancy.max),
    ] {
        POOL_CONNECTIONS
            .with_label_values(&[service, state])
            .set(value);
    }
}

/// Check out a real connection, recording how long it took and why it failed.
///
/// `/ready` goes through here so a saturated or closed pool reports
/// unavailable instead of queueing a query.
pub async fn acquire_with_metrics(
    pool: &PgPool,
    service: &str,
) -> Result<PoolConnection<Postgres>, sqlx::Error> {
    let started = Instant::now();
    let acquired = pool.acquire().await;

    POOL_ACQUIRE_SECONDS
        .with_label_values(&[service])
        .observe(started.elapsed().as_secs_f64());

    if let Err(e) = &acquired {
        POOL_ACQUIRE_FAILURES
            .with_label_values(&[service, failure_cause(e)])
            .inc();
    }

    acquired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupancy_splits_idle_and_in_use() {
        let occupancy = PoolOccupancy::new(8, 3, 20);
        assert_eq!(occupancy.idle, 3);
        assert_eq!(occupancy.in_use, 5);
        assert_eq!(occupancy.max, 20);
    }

    #[test]
    fn test_occupancy_never_negative() {
        // size and idle are read separately and can briefly disagree
        assert_eq!(PoolOccupancy::new(2, 4, 10).in_use, 0);
    }

    #[test]
    fn test_failure_causes() {
        assert_eq!(failure_cause(&sqlx::Error::PoolTimedOut), "timeout");
        assert_eq!(failure_cause(&sqlx::Error::PoolClosed), "closed");
        assert_eq!(failure_cause(&sqlx::Error::RowNotFound), "other");
    }
}
