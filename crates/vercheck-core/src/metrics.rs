//! Metrics for vercheck.
//!
//! Uses the `metrics` crate facade. Nothing is recorded unless the host
//! application installs a recorder.

use metrics::{counter, histogram};
use std::time::Duration;

/// Metric names.
pub mod names {
    pub const CHECKS_TOTAL: &str = "vercheck_checks_total";
    pub const UPDATES_AVAILABLE_TOTAL: &str = "vercheck_updates_available_total";
    pub const CHECK_DURATION_SECONDS: &str = "vercheck_check_duration_seconds";
    pub const ERRORS_TOTAL: &str = "vercheck_errors_total";
    pub const PUBLISHED_TOTAL: &str = "vercheck_published_total";
}

/// Describe all vercheck metrics to the installed recorder.
pub fn describe_metrics() {
    metrics::describe_counter!(names::CHECKS_TOTAL, "Total number of update checks");
    metrics::describe_counter!(
        names::UPDATES_AVAILABLE_TOTAL,
        "Checks that found a newer version"
    );
    metrics::describe_histogram!(
        names::CHECK_DURATION_SECONDS,
        "Update check duration in seconds, fetch included"
    );
    metrics::describe_counter!(names::ERRORS_TOTAL, "Total number of failed checks");
    metrics::describe_counter!(names::PUBLISHED_TOTAL, "Total number of published manifests");
}

/// Record a finished check.
pub fn record_check(source: &'static str, update_available: bool, elapsed: Duration) {
    counter!(names::CHECKS_TOTAL, "source" => source).increment(1);
    if update_available {
        counter!(names::UPDATES_AVAILABLE_TOTAL, "source" => source).increment(1);
    }
    histogram!(names::CHECK_DURATION_SECONDS).record(elapsed.as_secs_f64());
}

/// Record a failed check.
pub fn record_error(kind: &'static str) {
    counter!(names::ERRORS_TOTAL, "type" => kind).increment(1);
}

/// Record a published manifest.
pub fn record_publish() {
    counter!(names::PUBLISHED_TOTAL).increment(1);
}
