// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! The single gate every batch passes before it may extend the ledger.

use crate::config::HASH_HEX_LEN;
use crate::error::{KernelError, KernelResult};
use crate::types::BlockRecord;

/// A well-formed hash is exactly 64 lowercase hex characters.
pub fn well_formed_hash(hash: &str) -> bool {
    hash.len() == HASH_HEX_LEN
        && hash.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Checks that the batch is an exact contiguous ascending run of heights
/// (no duplicates, no gaps) and every hash is well-formed. The batch must
/// already be ordered; adapters sort before handing batches over.
pub fn validate_batch(blocks: &[BlockRecord]) -> KernelResult<()> {
    let first = blocks.first().ok_or(KernelError::EmptyBatch)?;

    let mut expected = first.height;
    for block in blocks {
        if block.height != expected {
            return Err(KernelError::DiscontinuousHeights {
                expected,
                got: block.height,
            });
        }
        if !well_formed_hash(&block.hash) {
            return Err(KernelError::InvalidBlockHash(block.hash.clone()));
        }
        expected += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn block(height: u64) -> BlockRecord {
        BlockRecord {
            height,
            hash: format!("{height:064x}"),
            timestamp: Utc.timestamp_opt(1_700_000_000 + height as i64, 0).unwrap(),
        }
    }

    #[test]
    fn accepts_contiguous_run() {
        let batch: Vec<_> = (10..20).map(block).collect();
        assert!(validate_batch(&batch).is_ok());
    }

    #[test]
    fn rejects_empty_batch() {
        assert_eq!(validate_batch(&[]), Err(KernelError::EmptyBatch));
    }

    #[test]
    fn rejects_gap() {
        let mut batch: Vec<_> = (0..5).map(block).collect();
        batch.remove(2);
        assert_eq!(
            validate_batch(&batch),
            Err(KernelError::DiscontinuousHeights { expected: 2, got: 3 })
        );
    }

    #[test]
    fn rejects_duplicate() {
        let mut batch: Vec<_> = (0..5).map(block).collect();
        batch.insert(2, block(2));
        assert!(matches!(
            validate_batch(&batch),
            Err(KernelError::DiscontinuousHeights { .. })
        ));
    }

    #[test]
    fn rejects_bad_hash() {
        let mut batch: Vec<_> = (0..3).map(block).collect();
        batch[1].hash = "deadbeef".into();
        assert!(matches!(
            validate_batch(&batch),
            Err(KernelError::InvalidBlockHash(_))
        ));
    }

    #[test]
    fn rejects_uppercase_hash() {
        assert!(!well_formed_hash(&"A".repeat(64)));
        assert!(!well_formed_hash(&"g".repeat(64)));
        assert!(well_formed_hash(&"a".repeat(64)));
        assert!(!well_formed_hash(&"a".repeat(63)));
    }
}
