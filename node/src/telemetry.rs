// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::sync::OnceLock;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const RECONCILE_TOTAL: &str = "infraction_sync_reconcile_total";
pub const RECONCILE_DURATION: &str = "infraction_sync_reconcile_duration_seconds";
pub const EVENTS_RECEIVED: &str = "infraction_sync_events_received_total";
pub const TASK_PANICS: &str = "infraction_sync_task_panics_total";

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "infraction_sync_node=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus recorder; metrics disabled"),
    }

    metrics::describe_counter!(RECONCILE_TOTAL, "Reconciliation attempts by outcome");
    metrics::describe_histogram!(RECONCILE_DURATION, "Time taken by one reconciliation attempt");
    metrics::describe_counter!(EVENTS_RECEIVED, "Moderation events received from the gateway");
    metrics::describe_counter!(TASK_PANICS, "Reconciliation tasks that panicked");

    metrics::gauge!("infraction_sync_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
