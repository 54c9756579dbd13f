// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use blocklotto_kernel::KernelError;
use blocklotto_persistence::LedgerError;

/// Failures of a single upstream source adapter. `Network` is transient
/// and retried inside the adapter; everything else surfaces immediately.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("upstream semantic error: status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid hash format: {0}")]
    InvalidHashFormat(String),
    #[error("cannot parse timestamp: {0}")]
    TimestampParse(String),
    #[error("incomplete range result: requested {requested} blocks, got {got}")]
    IncompleteRange { requested: u64, got: u64 },
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("source adapter failed: {0}")]
    Source(#[from] SourceError),
    #[error("no source could provide a tip height")]
    NoHeightAvailable,
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("not found")]
    NotFound,
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            NodeError::NotFound => (StatusCode::NOT_FOUND, "resource not found".to_string()),
            NodeError::Kernel(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            NodeError::Ledger(LedgerError::ContinuityConflict { .. }) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            NodeError::Source(_) | NodeError::NoHeightAvailable => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            NodeError::Ledger(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
