use lazy_static::lazy_static;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};

lazy_static! {
    /// Repository calls by backend, operation and outcome (ok/not_found/error).
    pub static ref REPOSITORY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posts_repository_operations_total",
        "Post repository calls segmented by backend, operation and outcome",
        &["backend", "operation", "outcome"]
    )
    .expect("failed to register posts_repository_operations_total");

    /// Latency of repository calls by backend and operation.
    pub static ref REPOSITORY_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "posts_repository_operation_duration_seconds",
        "Post repository call duration segmented by backend and operation",
        &["backend", "operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("failed to register posts_repository_operation_duration_seconds");
}
