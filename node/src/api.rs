// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

use blocklotto_kernel::types::{AuditRecord, BlockRecord, DrawRecord};

#[derive(Serialize, Deserialize)]
pub struct IndexResponse {
    /// Newest draws first, capped at 20.
    pub draws: Vec<DrawRecord>,
    /// Total number of draws so far.
    pub num_trials: u64,
    /// End height of the newest draw's window, 0 before the first draw.
    pub last_draw_height: u64,
    /// Current ledger watermark.
    pub current_height: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct DrawsResponse {
    pub draws: Vec<DrawRecord>,
}

#[derive(Serialize, Deserialize)]
pub struct DrawDetailResponse {
    pub draw: DrawRecord,
    /// The 144 blocks whose hashes the draw was derived from.
    pub blocks: Vec<BlockRecord>,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub statistics: Option<AuditRecord>,
}

#[derive(Serialize, Deserialize)]
pub struct TriggerResponse {
    pub message: String,
}
