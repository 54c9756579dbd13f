// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Cross-source range reconciliation.
//!
//! Trust is asymmetric: the primary source is authoritative, secondaries
//! are sanity checks. A disagreement is logged once and counted, never
//! merged and never fatal. A primary failure is fatal for the call; there
//! is no silent fallback to a secondary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use blocklotto_kernel::types::BlockRecord;

use crate::adapters::SourceAdapter;
use crate::errors::NodeError;

pub struct RangeFetcher {
    primary: Arc<dyn SourceAdapter>,
    secondaries: Vec<Arc<dyn SourceAdapter>>,
    mismatches: AtomicU64,
}

impl RangeFetcher {
    pub fn new(primary: Arc<dyn SourceAdapter>, secondaries: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            primary,
            secondaries,
            mismatches: AtomicU64::new(0),
        }
    }

    /// Total reconciliation mismatches observed since construction.
    pub fn mismatch_count(&self) -> u64 {
        self.mismatches.load(Ordering::Relaxed)
    }

    /// Fetches `[start, start+count)` from the primary and every
    /// secondary and returns the primary's (authoritative) sequence.
    pub async fn fetch_reconciled(
        &self,
        start: u64,
        count: u64,
    ) -> Result<Vec<BlockRecord>, NodeError> {
        let authoritative = self.primary.fetch_range(start, count).await?;

        for secondary in &self.secondaries {
            match secondary.fetch_range(start, count).await {
                Ok(shadow) => {
                    if shadow != authoritative {
                        self.mismatches.fetch_add(1, Ordering::Relaxed);
                        metrics::counter!(
                            "blocklotto_reconcile_mismatches_total", 1,
                            "secondary" => secondary.name()
                        );
                        tracing::warn!(
                            primary = self.primary.name(),
                            secondary = secondary.name(),
                            start,
                            count,
                            "sources disagree on block range, trusting primary"
                        );
                    }
                }
                Err(e) => {
                    // The sanity check is best-effort; a dead secondary
                    // must not block ingestion.
                    tracing::warn!(
                        secondary = secondary.name(),
                        error = %e,
                        "secondary range fetch failed, skipping cross-check"
                    );
                }
            }
        }

        Ok(authoritative)
    }
}
