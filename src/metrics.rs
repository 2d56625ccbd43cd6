//! Request metrics for the prediction endpoint.
//!
//! Tracks request counts, rows predicted, and cumulative pipeline latency.
//! Counters are atomics shared across handlers; a snapshot derives the rates.
//! Exposed in Prometheus text format at `GET /metrics`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Central metrics collector shared by all request handlers.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Total number of prediction requests
    total_requests: Arc<AtomicUsize>,
    /// Requests that returned an archive
    successful_requests: Arc<AtomicUsize>,
    /// Requests that returned an error
    failed_requests: Arc<AtomicUsize>,
    /// Total rows predicted across all requests
    total_rows: Arc<AtomicUsize>,
    /// Total pipeline time (parse through package) in microseconds
    total_pipeline_time_us: Arc<AtomicU64>,
    /// Start time for rate calculations
    start_time: Instant,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_requests: Arc::new(AtomicUsize::new(0)),
            successful_requests: Arc::new(AtomicUsize::new(0)),
            failed_requests: Arc::new(AtomicUsize::new(0)),
            total_rows: Arc::new(AtomicUsize::new(0)),
            total_pipeline_time_us: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction request.
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, rows: usize, duration: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_rows.fetch_add(rows, Ordering::Relaxed);
        self.total_pipeline_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a failed prediction request.
    pub fn record_failure(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Current snapshot of all counters and derived rates.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let successful = self.successful_requests.load(Ordering::Relaxed);
        let failed = self.failed_requests.load(Ordering::Relaxed);
        let total_rows = self.total_rows.load(Ordering::Relaxed);
        let total_time_us = self.total_pipeline_time_us.load(Ordering::Relaxed);
        let uptime = self.start_time.elapsed();

        MetricsSnapshot {
            total_requests,
            successful_requests: successful,
            failed_requests: failed,
            total_rows,
            total_pipeline_time_us: total_time_us,
            uptime_secs: uptime.as_secs(),
            avg_latency_ms: if successful > 0 {
                (total_time_us as f64 / 1000.0) / successful as f64
            } else {
                0.0
            },
            error_rate: if total_requests > 0 {
                failed as f64 / total_requests as f64
            } else {
                0.0
            },
        }
    }

    /// Export metrics in Prometheus text format.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        format!(
            "# HELP tarifa_requests_total Total prediction requests\n\
             # TYPE tarifa_requests_total counter\n\
             tarifa_requests_total {}\n\
             # HELP tarifa_requests_successful Successful requests\n\
             # TYPE tarifa_requests_successful counter\n\
             tarifa_requests_successful {}\n\
             # HELP tarifa_requests_failed Failed requests\n\
             # TYPE tarifa_requests_failed counter\n\
             tarifa_requests_failed {}\n\
             # HELP tarifa_rows_predicted Total rows predicted\n\
             # TYPE tarifa_rows_predicted counter\n\
             tarifa_rows_predicted {}\n\
             # HELP tarifa_pipeline_time_seconds Total pipeline time\n\
             # TYPE tarifa_pipeline_time_seconds counter\n\
             tarifa_pipeline_time_seconds {:.6}\n\
             # HELP tarifa_avg_latency_ms Average request latency in milliseconds\n\
             # TYPE tarifa_avg_latency_ms gauge\n\
             tarifa_avg_latency_ms {:.2}\n\
             # HELP tarifa_error_rate Error rate (0.0-1.0)\n\
             # TYPE tarifa_error_rate gauge\n\
             tarifa_error_rate {:.4}\n\
             # HELP tarifa_uptime_seconds Uptime in seconds\n\
             # TYPE tarifa_uptime_seconds counter\n\
             tarifa_uptime_seconds {}\n",
            snapshot.total_requests,
            snapshot.successful_requests,
            snapshot.failed_requests,
            snapshot.total_rows,
            snapshot.total_pipeline_time_us as f64 / 1_000_000.0,
            snapshot.avg_latency_ms,
            snapshot.error_rate,
            snapshot.uptime_secs
        )
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Total prediction requests
    pub total_requests: usize,
    /// Successful requests
    pub successful_requests: usize,
    /// Failed requests
    pub failed_requests: usize,
    /// Total rows predicted
    pub total_rows: usize,
    /// Total pipeline time in microseconds
    pub total_pipeline_time_us: u64,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Average request latency in milliseconds
    pub avg_latency_ms: f64,
    /// Error rate as a fraction (0.0 to 1.0)
    pub error_rate: f64,
}
