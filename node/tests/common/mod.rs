#![allow(dead_code)] // not every test binary uses every helper

//! Shared mock source for ingestion/reconciliation tests. Serves the
//! fixture chain (hash = zero-padded height) with configurable tip,
//! per-height hash overrides, forced failures, and a height shift that
//! simulates a provider whose idea of "height N" is off by some amount.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use blocklotto_node::adapters::SourceAdapter;
use blocklotto_node::errors::SourceError;
use blocklotto_node::ingest::SharedLedger;
use blocklotto_kernel::types::BlockRecord;
use blocklotto_persistence::{fixtures, MemoryLedger};

pub struct MockAdapter {
    pub name: &'static str,
    pub tip: Result<u64, ()>,
    pub hash_overrides: HashMap<u64, String>,
    pub fail_ranges: bool,
    pub height_shift: u64,
    pub range_calls: AtomicU64,
}

impl MockAdapter {
    pub fn new(name: &'static str, tip: u64) -> Self {
        Self {
            name,
            tip: Ok(tip),
            hash_overrides: HashMap::new(),
            fail_ranges: false,
            height_shift: 0,
            range_calls: AtomicU64::new(0),
        }
    }

    pub fn failing_tip(name: &'static str) -> Self {
        let mut mock = Self::new(name, 0);
        mock.tip = Err(());
        mock
    }

    pub fn with_hash_override(mut self, height: u64, hash: impl Into<String>) -> Self {
        self.hash_overrides.insert(height, hash.into());
        self
    }

    pub fn with_failing_ranges(mut self) -> Self {
        self.fail_ranges = true;
        self
    }

    pub fn with_height_shift(mut self, shift: u64) -> Self {
        self.height_shift = shift;
        self
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_tip_height(&self) -> Result<u64, SourceError> {
        self.tip
            .map_err(|_| SourceError::Network("mock tip unavailable".into()))
    }

    async fn fetch_range(&self, start: u64, count: u64) -> Result<Vec<BlockRecord>, SourceError> {
        self.range_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_ranges {
            return Err(SourceError::Network("mock range unavailable".into()));
        }
        let blocks = (start..start + count)
            .map(|h| {
                let mut block = fixtures::block(h + self.height_shift);
                if let Some(hash) = self.hash_overrides.get(&h) {
                    block.hash = hash.clone();
                }
                block
            })
            .collect();
        Ok(blocks)
    }
}

pub fn memory_ledger() -> SharedLedger {
    Arc::new(Mutex::new(MemoryLedger::new()))
}
