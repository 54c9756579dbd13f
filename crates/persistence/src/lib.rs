// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Persistence collaborator of the blocklotto engine.
//!
//! The core never mutates or deletes: blocks, draws and audits are
//! append-only, and block appends are gated on contiguity with the current
//! watermark. [`FileLedger`] keeps everything in crc64-framed append-only
//! logs; [`MemoryLedger`] backs tests.

pub mod error;
pub mod fixtures;
pub mod frame;
pub mod ledger;
pub mod memory;
pub mod store;

pub use error::{LedgerError, Result};
pub use ledger::FileLedger;
pub use memory::MemoryLedger;
pub use store::LedgerStore;
