// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Thin JSON front end over the ledger, plus manual triggers. The
//! engineering lives in `ingest`/`draws`; handlers only read state and
//! spawn background cycles.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::*;
use crate::draws;
use crate::errors::NodeError;
use crate::ingest::{Ingestor, SharedLedger};
use crate::telemetry;

const INDEX_DRAW_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub ingestor: Arc<Ingestor>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/v1/draws", get(all_draws))
        .route("/v1/draws/:id", get(draw_detail))
        .route("/v1/stats", get(stats))
        .route("/v1/ingest/trigger", post(trigger_ingest))
        .route("/v1/stats/refresh", post(refresh_stats))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Result<Json<IndexResponse>, NodeError> {
    let store = state.ledger.lock().await;
    let draws = store.recent_draws(INDEX_DRAW_LIMIT)?;
    let num_trials = store.max_draw_id().map_or(0, |id| id + 1);
    let last_draw_height = draws.first().map_or(0, |d| d.end_height);
    let current_height = store.max_persisted_height();
    Ok(Json(IndexResponse {
        draws,
        num_trials,
        last_draw_height,
        current_height,
    }))
}

async fn all_draws(State(state): State<AppState>) -> Result<Json<DrawsResponse>, NodeError> {
    let draws = state.ledger.lock().await.all_draws()?;
    Ok(Json(DrawsResponse { draws }))
}

async fn draw_detail(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DrawDetailResponse>, NodeError> {
    let store = state.ledger.lock().await;
    let draw = store.draw_by_id(id)?.ok_or(NodeError::NotFound)?;
    let blocks = store.blocks_in_range(draw.start_height, draw.end_height)?;
    Ok(Json(DrawDetailResponse { draw, blocks }))
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, NodeError> {
    let statistics = state.ledger.lock().await.last_audit()?;
    Ok(Json(StatsResponse { statistics }))
}

async fn trigger_ingest(State(state): State<AppState>) -> Json<TriggerResponse> {
    let ledger = state.ledger.clone();
    let ingestor = state.ingestor.clone();
    tokio::spawn(async move {
        if let Err(e) = draws::run_cycle(&ingestor, &ledger).await {
            tracing::error!(error = %e, "manually triggered cycle failed");
        }
    });
    Json(TriggerResponse {
        message: "ingestion cycle triggered, check back shortly".into(),
    })
}

async fn refresh_stats(State(state): State<AppState>) -> Json<TriggerResponse> {
    let ledger = state.ledger.clone();
    tokio::spawn(async move {
        if let Err(e) = draws::refresh_statistics(&ledger).await {
            tracing::error!(error = %e, "statistics refresh failed");
        }
    });
    Json(TriggerResponse {
        message: "statistics refresh triggered, check back shortly".into(),
    })
}

async fn metrics_endpoint() -> String {
    telemetry::render_metrics()
}
