//! The operation surface the core depends on. Everything is append-only;
//! reads return owned copies so callers never borrow into the store.

use blocklotto_kernel::types::{AuditRecord, BlockRecord, DrawRecord};

use crate::error::{LedgerError, Result};

/// Continuity gate shared by every store implementation: the batch must be
/// non-empty, start at `watermark + 1` (0 for an empty ledger) and be a
/// strict `+1` run.
pub(crate) fn check_batch(blocks: &[BlockRecord], watermark: Option<u64>) -> Result<()> {
    let expected = watermark.map_or(0, |w| w + 1);
    let first = blocks.first().ok_or_else(|| {
        LedgerError::InvalidFormat("empty batch".into())
    })?;
    if first.height != expected {
        return Err(LedgerError::ContinuityConflict { expected, got: first.height });
    }
    for (offset, block) in blocks.iter().enumerate() {
        let want = expected + offset as u64;
        if block.height != want {
            return Err(LedgerError::ContinuityConflict { expected: want, got: block.height });
        }
    }
    Ok(())
}

pub(crate) fn check_draw_id(id: u64, max_draw_id: Option<u64>) -> Result<()> {
    let expected = max_draw_id.map_or(0, |d| d + 1);
    if id != expected {
        return Err(LedgerError::DrawIdConflict { expected, got: id });
    }
    Ok(())
}

pub trait LedgerStore {
    /// Highest contiguously persisted height, `None` for an empty ledger.
    fn max_persisted_height(&self) -> Option<u64>;

    /// Appends a batch as one atomic unit. Rejects with
    /// `ContinuityConflict` unless the batch's first height is exactly
    /// `max_persisted_height + 1` (or 0 when empty) and the batch itself
    /// is a strict `+1` run. The watermark is re-read inside the call, so
    /// a batch racing a concurrent writer is rejected, never interleaved.
    fn append_contiguous_batch(&mut self, blocks: &[BlockRecord]) -> Result<()>;

    /// Blocks with heights in `min..=max`, ordered ascending.
    fn blocks_in_range(&self, min: u64, max: u64) -> Result<Vec<BlockRecord>>;

    fn max_draw_id(&self) -> Option<u64>;

    /// Appends one draw; its id must be `max_draw_id + 1` (or 0).
    fn append_draw(&mut self, draw: &DrawRecord) -> Result<()>;

    fn all_draws(&self) -> Result<Vec<DrawRecord>>;

    /// The newest `limit` draws, newest first.
    fn recent_draws(&self, limit: usize) -> Result<Vec<DrawRecord>>;

    fn draw_by_id(&self, id: u64) -> Result<Option<DrawRecord>>;

    /// Appends an audit run. Runs supersede each other; only the latest
    /// is ever served.
    fn append_audit(&mut self, record: &AuditRecord) -> Result<()>;

    fn last_audit(&self) -> Result<Option<AuditRecord>>;
}
