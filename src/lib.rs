// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Deterministic core of the blocklotto engine.
//!
//! Everything in this crate is pure and synchronous: given the same block
//! hashes it produces the same bytes, on every machine, forever. Network
//! fetching lives in `blocklotto-node`, storage in `blocklotto-persistence`.

pub mod audit;
pub mod config;
pub mod derive;
pub mod error;
pub mod types;
pub mod validate;

pub use error::{KernelError, KernelResult};
