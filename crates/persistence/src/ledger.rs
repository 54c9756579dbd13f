// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! File-backed store: three append-only frame logs under one directory,
//! replayed into memory on open.
//!
//! A batch append is one buffered write followed by `sync_data`, so a
//! crash leaves at worst a torn tail, which open() truncates away. The
//! continuity check runs against the in-memory watermark inside the append
//! call; callers serialize access by sharing the ledger behind a mutex.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use blocklotto_kernel::types::{AuditRecord, BlockRecord, DrawRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::frame::{push_frame, FrameReader};
use crate::store::{check_batch, check_draw_id, LedgerStore};

const BLOCKS_LOG: &str = "blocks.log";
const DRAWS_LOG: &str = "draws.log";
const AUDITS_LOG: &str = "audits.log";

#[derive(Debug)]
pub struct FileLedger {
    dir: PathBuf,
    blocks: Vec<BlockRecord>,
    draws: Vec<DrawRecord>,
    last_audit: Option<AuditRecord>,
    audit_seq: u64,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| LedgerError::Codec(e.to_string()))
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| LedgerError::Codec(e.to_string()))
}

/// Replays one log, truncating a torn tail if the last append was cut
/// short by a crash.
fn replay<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = FrameReader::new(file);

    let mut records = Vec::new();
    while let Some(frame) = reader.next_frame()? {
        records.push(decode(&frame.payload)?);
    }

    if reader.valid_len() < file_len {
        let valid = reader.valid_len();
        OpenOptions::new().write(true).open(path)?.set_len(valid)?;
    }
    Ok(records)
}

fn append_frames(path: &Path, frames: &[(u64, Vec<u8>)]) -> Result<()> {
    let mut buf = Vec::new();
    for (seq, payload) in frames {
        push_frame(&mut buf, *seq, payload);
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(&buf)?;
    file.sync_data()?;
    Ok(())
}

impl FileLedger {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let blocks: Vec<BlockRecord> = replay(&dir.join(BLOCKS_LOG))?;
        let draws: Vec<DrawRecord> = replay(&dir.join(DRAWS_LOG))?;
        let audits: Vec<AuditRecord> = replay(&dir.join(AUDITS_LOG))?;

        // The replayed ledger must itself satisfy the invariant it enforces.
        for (i, block) in blocks.iter().enumerate() {
            if block.height != i as u64 {
                return Err(LedgerError::InvalidFormat(format!(
                    "block log is not contiguous from 0: index {i} holds height {}",
                    block.height
                )));
            }
        }
        for (i, draw) in draws.iter().enumerate() {
            if draw.id != i as u64 {
                return Err(LedgerError::InvalidFormat(format!(
                    "draw log is not dense from 0: index {i} holds id {}",
                    draw.id
                )));
            }
        }

        let audit_seq = audits.len() as u64;
        Ok(Self {
            dir,
            blocks,
            draws,
            last_audit: audits.into_iter().last(),
            audit_seq,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LedgerStore for FileLedger {
    fn max_persisted_height(&self) -> Option<u64> {
        self.blocks.last().map(|b| b.height)
    }

    fn append_contiguous_batch(&mut self, blocks: &[BlockRecord]) -> Result<()> {
        check_batch(blocks, self.max_persisted_height())?;

        let frames = blocks
            .iter()
            .map(|b| Ok((b.height, encode(b)?)))
            .collect::<Result<Vec<_>>>()?;
        append_frames(&self.dir.join(BLOCKS_LOG), &frames)?;

        self.blocks.extend_from_slice(blocks);
        Ok(())
    }

    fn blocks_in_range(&self, min: u64, max: u64) -> Result<Vec<BlockRecord>> {
        let lo = min as usize;
        let hi = (max as usize + 1).min(self.blocks.len());
        if lo >= hi {
            return Ok(Vec::new());
        }
        Ok(self.blocks[lo..hi].to_vec())
    }

    fn max_draw_id(&self) -> Option<u64> {
        self.draws.last().map(|d| d.id)
    }

    fn append_draw(&mut self, draw: &DrawRecord) -> Result<()> {
        check_draw_id(draw.id, self.max_draw_id())?;
        append_frames(&self.dir.join(DRAWS_LOG), &[(draw.id, encode(draw)?)])?;
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
        append_frames(
            &self.dir.join(AUDITS_LOG),
            &[(self.audit_seq, encode(record)?)],
        )?;
        self.audit_seq += 1;
        self.last_audit = Some(record.clone());
        Ok(())
    }

    fn last_audit(&self) -> Result<Option<AuditRecord>> {
        Ok(self.last_audit.clone())
    }
}
