// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Record types shared across the ledger, the node and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::FRONT_PICKS;

/// One block of the gapless ledger. Heights are the primary key and are
/// only ever appended in a contiguous run starting at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub height: u64,
    /// 64 lowercase hex characters.
    pub hash: String,
    pub timestamp: DateTime<Utc>,
}

/// One derived draw. Reproducible byte-for-byte from the hashes of the
/// heights in `[start_height, end_height]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    /// Dense, gapless, starting at 0.
    pub id: u64,
    /// Sorted ascending, distinct, each in 1..=FRONT_POOL_MAX.
    pub front: [u8; FRONT_PICKS],
    /// In 1..=BACK_MAX.
    pub back: u8,
    /// Copied from the last block of the window.
    pub timestamp: DateTime<Utc>,
    pub start_height: u64,
    pub end_height: u64,
}

/// Result of one uniformity audit run over all draws. Each run supersedes
/// the previous one; only the latest is served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub draws: u64,
    pub front_chi2: f64,
    pub front_p_value: f64,
    pub front_conclusion: String,
    pub back_chi2: f64,
    pub back_p_value: f64,
    pub back_conclusion: String,
    pub timestamp: DateTime<Utc>,
}
