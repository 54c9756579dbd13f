// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Draw production and the statistics refresh.
//!
//! Draws consume fixed 144-block windows in dense id order. A draw whose
//! window is not yet fully persisted is simply not ready, which is not an
//! error, just "come back after the next ingest".

use chrono::Utc;

use blocklotto_kernel::audit::audit_draws;
use blocklotto_kernel::config::WINDOW_SIZE;
use blocklotto_kernel::derive::{derive, window_for_draw};
use blocklotto_kernel::types::{AuditRecord, DrawRecord};

use crate::errors::NodeError;
use crate::ingest::{IngestReport, Ingestor, SharedLedger};

/// Derives and appends every draw whose window is fully persisted.
/// Returns how many draws were produced.
pub async fn produce_available_draws(ledger: &SharedLedger) -> Result<u64, NodeError> {
    let mut produced = 0u64;

    loop {
        let mut store = ledger.lock().await;

        let next_id = store.max_draw_id().map_or(0, |id| id + 1);
        let window = window_for_draw(next_id);
        let needed = window.end - 1;
        match store.max_persisted_height() {
            Some(max) if max >= needed => {}
            _ => break, // window not yet available
        }

        let blocks = store.blocks_in_range(window.start, window.end - 1)?;
        debug_assert_eq!(blocks.len(), WINDOW_SIZE);

        let hashes: Vec<&str> = blocks.iter().map(|b| b.hash.as_str()).collect();
        let draw = derive(&hashes)?;

        let record = DrawRecord {
            id: next_id,
            front: draw.front,
            back: draw.back,
            timestamp: blocks.last().expect("window is non-empty").timestamp,
            start_height: window.start,
            end_height: window.end - 1,
        };
        store.append_draw(&record)?;
        drop(store);

        metrics::counter!("blocklotto_draws_derived_total", 1);
        tracing::info!(
            draw_id = next_id,
            start_height = record.start_height,
            end_height = record.end_height,
            "draw derived"
        );
        produced += 1;
    }

    Ok(produced)
}

/// Re-audits all draws and appends a fresh audit record, superseding the
/// previous one. A draw-less ledger is left alone.
pub async fn refresh_statistics(ledger: &SharedLedger) -> Result<bool, NodeError> {
    let mut store = ledger.lock().await;
    let draws = store.all_draws()?;

    let Some(summary) = audit_draws(&draws) else {
        return Ok(false);
    };

    let record = AuditRecord {
        draws: summary.draws,
        front_chi2: summary.front.chi2,
        front_p_value: summary.front.p_value,
        front_conclusion: summary.front.conclusion().to_string(),
        back_chi2: summary.back.chi2,
        back_p_value: summary.back.p_value,
        back_conclusion: summary.back.conclusion().to_string(),
        timestamp: Utc::now(),
    };
    store.append_audit(&record)?;

    tracing::info!(
        draws = record.draws,
        front_p = record.front_p_value,
        back_p = record.back_p_value,
        "uniformity audit refreshed"
    );
    Ok(true)
}

/// One full periodic cycle: ingest to the tip, derive newly available
/// draws, refresh the audit. The audit is monitoring only and must never
/// fail the cycle.
pub async fn run_cycle(ingestor: &Ingestor, ledger: &SharedLedger) -> Result<IngestReport, NodeError> {
    let report = ingestor.run().await?;

    let produced = produce_available_draws(ledger).await?;
    if produced > 0 {
        if let Err(e) = refresh_statistics(ledger).await {
            tracing::warn!(error = %e, "statistics refresh failed");
        }
    }

    Ok(report)
}
