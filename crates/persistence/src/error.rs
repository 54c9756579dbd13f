use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: u64, found: u64 },
    /// Append rejected because the batch does not extend the current
    /// watermark. Also raised when a concurrent writer won the race.
    #[error("continuity conflict: expected next height {expected}, got {got}")]
    ContinuityConflict { expected: u64, got: u64 },
    #[error("draw id conflict: expected next id {expected}, got {got}")]
    DrawIdConflict { expected: u64, got: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("codec error: {0}")]
    Codec(String),
    #[error("invalid data format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
