//! Error types.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KernelError {
    /// A draw window must contain exactly `WINDOW_SIZE` hashes.
    #[error("wrong window size: expected {expected} hashes, got {got}")]
    WrongWindowSize { expected: usize, got: usize },
    /// Batch heights are not one contiguous ascending run.
    #[error("discontinuous heights: expected {expected}, got {got}")]
    DiscontinuousHeights { expected: u64, got: u64 },
    /// A hash is not 64 lowercase hex characters.
    #[error("invalid block hash: {0}")]
    InvalidBlockHash(String),
    /// An empty batch can neither be validated nor persisted.
    #[error("empty batch")]
    EmptyBatch,
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;
