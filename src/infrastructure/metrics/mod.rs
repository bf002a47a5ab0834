//! Prometheus metrics for the notification service.
//!
//! - Resource metrics (notifications, categories and users created or deleted)
//! - Validation metrics (rejected writes by reason)
//! - Authentication metrics (failed Basic logins)

mod helpers;

pub use helpers::{encode_metrics, AuthMetrics, ResourceMetrics, ValidationMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "notification_service";

lazy_static! {
    /// Total notifications created
    pub static ref NOTIFICATIONS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_notifications_created_total", METRIC_PREFIX),
        "Total notifications created"
    ).unwrap();

    /// Total categories created, by how they came to exist
    pub static ref CATEGORIES_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_categories_created_total", METRIC_PREFIX),
        "Total notification categories created",
        &["origin"]
    ).unwrap();

    /// Total users registered
    pub static ref USERS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_users_created_total", METRIC_PREFIX),
        "Total users registered"
    ).unwrap();

    /// Total resources deleted by resource type
    pub static ref RESOURCES_DELETED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_resources_deleted_total", METRIC_PREFIX),
        "Total resources deleted",
        &["resource"]
    ).unwrap();

    /// Rejected writes by reason
    pub static ref VALIDATION_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_validation_failures_total", METRIC_PREFIX),
        "Total requests rejected by validation",
        &["reason"]
    ).unwrap();

    /// Failed authentication attempts
    pub static ref AUTH_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_auth_failures_total", METRIC_PREFIX),
        "Total failed authentication attempts",
        &["reason"]
    ).unwrap();

    /// Current number of stored notifications
    pub static ref NOTIFICATIONS_STORED: IntGauge = register_int_gauge!(
        format!("{}_notifications_stored", METRIC_PREFIX),
        "Number of notifications currently stored"
    ).unwrap();

    /// Current number of stored categories
    pub static ref CATEGORIES_STORED: IntGauge = register_int_gauge!(
        format!("{}_categories_stored", METRIC_PREFIX),
        "Number of notification categories currently stored"
    ).unwrap();
}
