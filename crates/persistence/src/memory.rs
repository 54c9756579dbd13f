//! In-memory store, primarily for tests and router-level test harnesses.

use blocklotto_kernel::types::{AuditRecord, BlockRecord, DrawRecord};

use crate::error::Result;
use crate::store::{check_batch, check_draw_id, LedgerStore};

#[derive(Debug, Default)]
pub struct MemoryLedger {
    blocks: Vec<BlockRecord>,
    draws: Vec<DrawRecord>,
    audits: Vec<AuditRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedger {
    fn max_persisted_height(&self) -> Option<u64> {
        self.blocks.last().map(|b| b.height)
    }

    fn append_contiguous_batch(&mut self, blocks: &[BlockRecord]) -> Result<()> {
        check_batch(blocks, self.max_persisted_height())?;
        self.blocks.extend_from_slice(blocks);
        Ok(())
    }

    fn blocks_in_range(&self, min: u64, max: u64) -> Result<Vec<BlockRecord>> {
        // Heights are dense from 0, so the range maps to indices directly.
        Ok(self
            .blocks
            .iter()
            .filter(|b| b.height >= min && b.height <= max)
            .cloned()
            .collect())
    }

    fn max_draw_id(&self) -> Option<u64> {
        self.draws.last().map(|d| d.id)
    }

    fn append_draw(&mut self, draw: &DrawRecord) -> Result<()> {
        check_draw_id(draw.id, self.max_draw_id())?;
        self.draws.push(draw.clone());
        Ok(())
    }

    fn all_draws(&self) -> Result<Vec<DrawRecord>> {
        Ok(self.draws.clone())
    }

    fn recent_draws(&self, limit: usize) -> Result<Vec<DrawRecord>> {
        Ok(self.draws.iter().rev().take(limit).cloned().collect())
    }

    fn draw_by_id(&self, id: u64) -> Result<Option<DrawRecord>> {
        Ok(self.draws.get(id as usize).cloned())
    }

    fn append_audit(&mut self, record: &AuditRecord) -> Result<()> {
        self.audits.push(record.clone());
        Ok(())
    }

    fn last_audit(&self) -> Result<Option<AuditRecord>> {
        Ok(self.audits.last().cloned())
    }
}
