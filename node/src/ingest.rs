// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! The gap-free incremental ingestion loop.
//!
//! One invocation drives watermark -> tip in bounded batches:
//! `Idle -> Fetching -> Validating -> Persisting -> (Idle | Halted)`.
//! Nothing partial is ever persisted: a failed batch fails the whole
//! invocation and the periodic driver retries on its own schedule. A
//! continuity conflict on append means a concurrent writer or a bug, so
//! the loop halts and reports instead of retrying.

use std::sync::Arc;

use tokio::sync::Mutex;

use blocklotto_kernel::validate::validate_batch;
use blocklotto_persistence::{LedgerError, LedgerStore};

use crate::errors::NodeError;
use crate::oracle::HeightOracle;
use crate::reconcile::RangeFetcher;

pub type SharedLedger = Arc<Mutex<dyn LedgerStore + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Watermark reached the tip.
    CaughtUp,
    /// Append was rejected mid-run; operator attention needed.
    Halted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub tip: u64,
    pub blocks_ingested: u64,
    /// Watermark after the run.
    pub watermark: Option<u64>,
    pub outcome: IngestOutcome,
}

pub struct Ingestor {
    oracle: HeightOracle,
    fetcher: RangeFetcher,
    ledger: SharedLedger,
    batch_cap: u64,
}

impl Ingestor {
    pub fn new(
        oracle: HeightOracle,
        fetcher: RangeFetcher,
        ledger: SharedLedger,
        batch_cap: u64,
    ) -> Self {
        Self {
            oracle,
            fetcher,
            ledger,
            batch_cap: batch_cap.max(1),
        }
    }

    pub fn fetcher(&self) -> &RangeFetcher {
        &self.fetcher
    }

    pub async fn run(&self) -> Result<IngestReport, NodeError> {
        let tip = self.oracle.current_tip_height().await?;
        let mut watermark = self.ledger.lock().await.max_persisted_height();
        let mut ingested = 0u64;

        tracing::info!(?watermark, tip, "ingestion run starting");

        loop {
            let next = watermark.map_or(0, |w| w + 1);
            if next > tip {
                break;
            }
            let count = self.batch_cap.min(tip - next + 1);

            tracing::debug!(phase = "fetching", start = next, count, "fetching batch");
            let batch = self.fetcher.fetch_reconciled(next, count).await?;

            tracing::debug!(phase = "validating", start = next, count, "validating batch");
            validate_batch(&batch)?;

            tracing::debug!(phase = "persisting", start = next, count, "appending batch");
            // Bind before matching so the lock is released; the conflict
            // arm takes it again to read the surviving watermark.
            let appended = self.ledger.lock().await.append_contiguous_batch(&batch);
            match appended {
                Ok(()) => {}
                Err(LedgerError::ContinuityConflict { expected, got }) => {
                    let reason = format!(
                        "append rejected: expected next height {expected}, got {got}"
                    );
                    tracing::error!(phase = "halted", %reason, "ingestion halted");
                    return Ok(IngestReport {
                        tip,
                        blocks_ingested: ingested,
                        watermark: self.ledger.lock().await.max_persisted_height(),
                        outcome: IngestOutcome::Halted { reason },
                    });
                }
                Err(e) => return Err(e.into()),
            }

            ingested += count;
            watermark = Some(next + count - 1);
            metrics::counter!("blocklotto_blocks_ingested_total", count);
            tracing::info!(watermark = watermark.unwrap(), tip, "batch persisted");
        }

        tracing::info!(?watermark, tip, blocks = ingested, "caught up");
        Ok(IngestReport {
            tip,
            blocks_ingested: ingested,
            watermark,
            outcome: IngestOutcome::CaughtUp,
        })
    }
}
