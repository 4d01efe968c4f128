//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Job lifecycle (starts, terminal outcomes)
//! - External commands run by the pipeline
//! - Event bus throughput

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs accepted by the transcriber.
pub static JOBS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("transcriber_jobs_started_total", "Total jobs started").unwrap()
});

/// Jobs that reached a terminal status.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("transcriber_jobs_finished_total", "Total jobs finished"),
        &["outcome"], // "done", "failed", "cancelled"
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// External commands run, by stage and result.
pub static COMMANDS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "transcriber_commands_total",
            "Total external commands executed",
        ),
        &["stage", "result"], // result: "success", "failed", "cancelled", "error"
    )
    .unwrap()
});

/// Wall-clock duration of external commands.
pub static COMMAND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "transcriber_command_duration_seconds",
            "Duration of external commands",
        )
        .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
        &["stage"],
    )
    .unwrap()
});

// =============================================================================
// Event Metrics
// =============================================================================

/// Events published on the bus, by type.
pub static EVENTS_PUBLISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("transcriber_events_published_total", "Total events published"),
        &["type"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_STARTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(COMMANDS_TOTAL.clone()),
        Box::new(COMMAND_DURATION.clone()),
        Box::new(EVENTS_PUBLISHED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        JOBS_FINISHED.with_label_values(&["done"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"transcriber_jobs_finished_total".to_string()));
    }
}
