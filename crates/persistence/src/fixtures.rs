//! Synthetic records for tests across the workspace.

use blocklotto_kernel::types::{BlockRecord, DrawRecord};
use chrono::{TimeZone, Utc};
use std::ops::Range;

/// Deterministic well-formed hash for a height: the height itself,
/// zero-padded to 64 hex characters.
pub fn hash_for_height(height: u64) -> String {
    format!("{height:064x}")
}

pub fn block(height: u64) -> BlockRecord {
    BlockRecord {
        height,
        hash: hash_for_height(height),
        // Bitcoin's 10-minute cadence, anchored at an arbitrary epoch.
        timestamp: Utc
            .timestamp_opt(1_700_000_000 + height as i64 * 600, 0)
            .unwrap(),
    }
}

pub fn blocks(heights: Range<u64>) -> Vec<BlockRecord> {
    heights.map(block).collect()
}

pub fn draw(id: u64) -> DrawRecord {
    DrawRecord {
        id,
        front: [3, 17, 29, 41, 64],
        back: (id % 26) as u8 + 1,
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        start_height: id * 144,
        end_height: id * 144 + 143,
    }
}
