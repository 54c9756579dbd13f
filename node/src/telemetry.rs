// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize telemetry (logs + metrics).
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "blocklotto_node=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    if PROM_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
    }

    metrics::describe_counter!(
        "blocklotto_blocks_ingested_total",
        "Blocks appended to the ledger"
    );
    metrics::describe_counter!(
        "blocklotto_draws_derived_total",
        "Draws derived from completed windows"
    );
    metrics::describe_counter!(
        "blocklotto_reconcile_mismatches_total",
        "Block ranges on which a secondary source disagreed with the primary"
    );
    metrics::describe_counter!(
        "blocklotto_source_retries_total",
        "Transient upstream failures that were retried"
    );

    metrics::gauge!("blocklotto_node_up", 1.0);
}

/// Prometheus exposition text for the /metrics endpoint.
pub fn render_metrics() -> String {
    PROM_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
