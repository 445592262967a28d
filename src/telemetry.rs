//! Runtime counters for the comparison engine.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by every clone of an engine.
#[derive(Debug, Clone, Default)]
pub struct EngineTelemetry {
    /// Number of analyses started.
    pub analyses: Arc<AtomicU64>,
    /// Number of analyses that returned an error.
    pub failures: Arc<AtomicU64>,
    /// Total roles passed to successful analyses.
    pub roles_compared: Arc<AtomicU64>,
    /// Analysis counts per duration bucket.
    pub duration_buckets: Arc<DashMap<&'static str, AtomicU64>>,
    /// Error counts by error name.
    pub error_counts: Arc<DashMap<String, AtomicU64>>,
}

impl EngineTelemetry {
    /// Create a new telemetry collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an analysis.
    pub fn record_analysis(&self) {
        self.analyses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful analysis over `role_count` roles.
    pub fn record_success(&self, role_count: usize) {
        self.roles_compared
            .fetch_add(role_count as u64, Ordering::Relaxed);
    }

    /// Record a failed analysis.
    pub fn record_error(&self, error_name: &str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.error_counts
            .entry(error_name.to_string())
            .and_modify(|count| {
                count.fetch_add(1, Ordering::Relaxed);
            })
            .or_insert_with(|| AtomicU64::new(1));
    }

    /// Record how long an analysis took.
    pub fn record_duration(&self, duration: Duration) {
        self.duration_buckets
            .entry(duration_to_bucket(duration))
            .and_modify(|count| {
                count.fetch_add(1, Ordering::Relaxed);
            })
            .or_insert_with(|| AtomicU64::new(1));
    }

    /// Get a point-in-time summary.
    pub fn summary(&self) -> TelemetrySummary {
        let analyses = self.analyses.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        TelemetrySummary {
            analyses,
            failures,
            success_rate: if analyses == 0 {
                0.0
            } else {
                analyses.saturating_sub(failures) as f64 / analyses as f64
            },
            roles_compared: self.roles_compared.load(Ordering::Relaxed),
            duration_buckets: self
                .duration_buckets
                .iter()
                .map(|entry| (entry.key().to_string(), entry.value().load(Ordering::Relaxed)))
                .collect(),
            error_counts: self
                .error_counts
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
                .collect(),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.analyses.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.roles_compared.store(0, Ordering::Relaxed);
        self.duration_buckets.clear();
        self.error_counts.clear();
    }

    /// Start a timer that records into this collector when dropped.
    pub fn start_timer(&self) -> AnalysisTimer {
        AnalysisTimer {
            start: Instant::now(),
            telemetry: self.clone(),
        }
    }
}

fn duration_to_bucket(duration: Duration) -> &'static str {
    match duration.as_micros() {
        0..=99 => "0-99μs",
        100..=999 => "100-999μs",
        1000..=9999 => "1-9ms",
        10000..=99999 => "10-99ms",
        100000..=999999 => "100-999ms",
        _ => "1s+",
    }
}

/// Summary of engine telemetry.
#[derive(Debug, Clone)]
pub struct TelemetrySummary {
    pub analyses: u64,
    pub failures: u64,
    pub success_rate: f64,
    pub roles_compared: u64,
    pub duration_buckets: HashMap<String, u64>,
    pub error_counts: HashMap<String, u64>,
}

/// Records the elapsed time of an analysis on drop.
pub struct AnalysisTimer {
    start: Instant,
    telemetry: EngineTelemetry,
}

impl AnalysisTimer {
    /// Time elapsed since the timer started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for AnalysisTimer {
    fn drop(&mut self) {
        self.telemetry.record_duration(self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_telemetry_basic_operations() {
        let telemetry = EngineTelemetry::new();

        telemetry.record_analysis();
        telemetry.record_success(3);
        telemetry.record_analysis();
        telemetry.record_error("InsufficientRoles");
        telemetry.record_analysis();
        telemetry.record_error("InsufficientRoles");

        let summary = telemetry.summary();
        assert_eq!(summary.analyses, 3);
        assert_eq!(summary.failures, 2);
        assert_eq!(summary.roles_compared, 3);
        assert_eq!(summary.error_counts.get("InsufficientRoles"), Some(&2));
        assert!((summary.success_rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_telemetry_reset() {
        let telemetry = EngineTelemetry::new();
        telemetry.record_analysis();
        telemetry.record_error("Analysis");
        telemetry.record_duration(Duration::from_millis(2));

        telemetry.reset();

        let summary = telemetry.summary();
        assert_eq!(summary.analyses, 0);
        assert_eq!(summary.failures, 0);
        assert!(summary.duration_buckets.is_empty());
        assert!(summary.error_counts.is_empty());
    }

    #[test]
    fn test_timer_records_on_drop() {
        let telemetry = EngineTelemetry::new();
        {
            let _timer = telemetry.start_timer();
            thread::sleep(Duration::from_millis(1));
        }
        let total: u64 = telemetry.summary().duration_buckets.values().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let telemetry = EngineTelemetry::new();
        let clone = telemetry.clone();
        clone.record_analysis();
        assert_eq!(telemetry.summary().analyses, 1);
    }

    #[test]
    fn test_duration_bucketing() {
        assert_eq!(duration_to_bucket(Duration::from_micros(50)), "0-99μs");
        assert_eq!(duration_to_bucket(Duration::from_micros(500)), "100-999μs");
        assert_eq!(duration_to_bucket(Duration::from_millis(5)), "1-9ms");
        assert_eq!(duration_to_bucket(Duration::from_millis(50)), "10-99ms");
        assert_eq!(duration_to_bucket(Duration::from_millis(500)), "100-999ms");
        assert_eq!(duration_to_bucket(Duration::from_secs(2)), "1s+");
    }
}
