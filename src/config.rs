// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Domain constants.

/// Number of consecutive block hashes consumed by one draw.
pub const WINDOW_SIZE: usize = 144;

/// Upper bound of the front-area number pool (numbers are 1..=FRONT_POOL_MAX).
pub const FRONT_POOL_MAX: u8 = 69;

/// Front-area numbers picked per draw, without replacement.
pub const FRONT_PICKS: usize = 5;

/// Upper bound of the back-area number (1..=BACK_MAX).
pub const BACK_MAX: u8 = 26;

/// Significance level for the uniformity audit.
pub const UNIFORMITY_ALPHA: f64 = 0.05;

/// Length of a well-formed block hash in hex characters.
pub const HASH_HEX_LEN: usize = 64;
