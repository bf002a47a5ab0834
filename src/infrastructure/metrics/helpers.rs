//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    AUTH_FAILURES_TOTAL, CATEGORIES_CREATED_TOTAL, NOTIFICATIONS_CREATED_TOTAL,
    RESOURCES_DELETED_TOTAL, USERS_CREATED_TOTAL, VALIDATION_FAILURES_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording resource lifecycle metrics
pub struct ResourceMetrics;

impl ResourceMetrics {
    pub fn record_notification_created() {
        NOTIFICATIONS_CREATED_TOTAL.inc();
    }

    /// Category created through its own endpoint
    pub fn record_category_created() {
        CATEGORIES_CREATED_TOTAL.with_label_values(&["explicit"]).inc();
    }

    /// Category created as a side effect of a notification write
    pub fn record_category_implicitly_created() {
        CATEGORIES_CREATED_TOTAL.with_label_values(&["implicit"]).inc();
    }

    pub fn record_user_created() {
        USERS_CREATED_TOTAL.inc();
    }

    pub fn record_deleted(resource: &str) {
        RESOURCES_DELETED_TOTAL.with_label_values(&[resource]).inc();
    }
}

/// Helper struct for recording validation metrics
pub struct ValidationMetrics;

impl ValidationMetrics {
    pub fn record_duplicate(field: &str) {
        VALIDATION_FAILURES_TOTAL
            .with_label_values(&[&format!("duplicate_{}", field)])
            .inc();
    }

    pub fn record_invalid_field(field: &str) {
        VALIDATION_FAILURES_TOTAL
            .with_label_values(&[&format!("invalid_{}", field)])
            .inc();
    }

    pub fn record_weak_password() {
        VALIDATION_FAILURES_TOTAL
            .with_label_values(&["weak_password"])
            .inc();
    }
}

/// Helper struct for recording authentication metrics
pub struct AuthMetrics;

impl AuthMetrics {
    pub fn record_missing_credentials() {
        AUTH_FAILURES_TOTAL.with_label_values(&["missing"]).inc();
    }

    pub fn record_malformed_credentials() {
        AUTH_FAILURES_TOTAL.with_label_values(&["malformed"]).inc();
    }

    pub fn record_unknown_user() {
        AUTH_FAILURES_TOTAL.with_label_values(&["unknown_user"]).inc();
    }

    pub fn record_wrong_password() {
        AUTH_FAILURES_TOTAL.with_label_values(&["wrong_password"]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        ResourceMetrics::record_category_implicitly_created();
        ValidationMetrics::record_duplicate("notification_message");

        let output = encode_metrics().unwrap();
        assert!(output.contains("notification_service_categories_created_total"));
        assert!(output.contains("duplicate_notification_message"));
    }
}
