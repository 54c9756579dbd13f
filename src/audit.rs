// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Uniformity audit: chi-square goodness-of-fit over all derived numbers.
//!
//! A monitoring signal only. It never blocks ingestion or derivation.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::config::{BACK_MAX, FRONT_POOL_MAX, UNIFORMITY_ALPHA};
use crate::types::DrawRecord;

pub const CONCLUSION_UNIFORM: &str = "uniform distribution (good randomness)";
pub const CONCLUSION_BIASED: &str = "non-uniform distribution (possible bias)";

/// Chi-square statistic and p-value for one number population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub chi2: f64,
    pub p_value: f64,
}

impl FitResult {
    pub fn conclusion(&self) -> &'static str {
        if self.p_value > UNIFORMITY_ALPHA {
            CONCLUSION_UNIFORM
        } else {
            CONCLUSION_BIASED
        }
    }
}

/// Audit of both number populations of a draw set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditSummary {
    pub draws: u64,
    pub front: FitResult,
    pub back: FitResult,
}

/// Goodness-of-fit of `values` (each in `1..=categories`) against the
/// uniform expectation. Degrees of freedom = `categories - 1`, no
/// continuity correction. `categories` must be at least 2; an empty
/// population is vacuously uniform.
pub fn chi_square_uniform(values: &[u8], categories: u8) -> FitResult {
    debug_assert!(categories >= 2);
    if values.is_empty() {
        return FitResult { chi2: 0.0, p_value: 1.0 };
    }

    let mut observed = vec![0u64; categories as usize];
    for &v in values {
        debug_assert!((1..=categories).contains(&v));
        observed[(v - 1) as usize] += 1;
    }
    let expected = values.len() as f64 / categories as f64;

    let chi2: f64 = observed
        .iter()
        .map(|&obs| {
            let diff = obs as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let dist = ChiSquared::new((categories - 1) as f64)
        .expect("degrees of freedom are positive");
    let p_value = 1.0 - dist.cdf(chi2);

    FitResult { chi2, p_value }
}

/// Flattens all front numbers and all back numbers of `draws` and tests
/// each population for uniformity. `None` when there are no draws yet.
pub fn audit_draws(draws: &[DrawRecord]) -> Option<AuditSummary> {
    if draws.is_empty() {
        return None;
    }

    let front_all: Vec<u8> = draws.iter().flat_map(|d| d.front).collect();
    let back_all: Vec<u8> = draws.iter().map(|d| d.back).collect();

    Some(AuditSummary {
        draws: draws.len() as u64,
        front: chi_square_uniform(&front_all, FRONT_POOL_MAX),
        back: chi_square_uniform(&back_all, BACK_MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn draw(id: u64, front: [u8; 5], back: u8) -> DrawRecord {
        DrawRecord {
            id,
            front,
            back,
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            start_height: id * 144,
            end_height: id * 144 + 143,
        }
    }

    #[test]
    fn evenly_cycled_back_numbers_look_uniform() {
        // 1000 back numbers cycling 1..=26: counts differ by at most one
        // from the expectation, chi2 ~ 0.17 with 25 dof.
        let values: Vec<u8> = (0..1000).map(|i| (i % 26) as u8 + 1).collect();
        let fit = chi_square_uniform(&values, BACK_MAX);
        assert!(fit.chi2 < 1.0, "chi2 = {}", fit.chi2);
        assert!(fit.p_value > UNIFORMITY_ALPHA);
        assert_eq!(fit.conclusion(), CONCLUSION_UNIFORM);
    }

    #[test]
    fn constant_back_number_is_flagged() {
        let values = vec![1u8; 1000];
        let fit = chi_square_uniform(&values, BACK_MAX);
        assert!(fit.p_value <= UNIFORMITY_ALPHA);
        assert_eq!(fit.conclusion(), CONCLUSION_BIASED);
    }

    #[test]
    fn audit_flattens_both_populations() {
        // Front numbers cycling through 1..=69 across draws, back cycling
        // 1..=26: both populations should pass.
        let mut n = 0u64;
        let draws: Vec<_> = (0..1000)
            .map(|id| {
                let mut front = [0u8; 5];
                for slot in front.iter_mut() {
                    *slot = (n % 69) as u8 + 1;
                    n += 1;
                }
                draw(id, front, (id % 26) as u8 + 1)
            })
            .collect();

        let summary = audit_draws(&draws).unwrap();
        assert_eq!(summary.draws, 1000);
        assert_eq!(summary.front.conclusion(), CONCLUSION_UNIFORM);
        assert_eq!(summary.back.conclusion(), CONCLUSION_UNIFORM);
    }

    #[test]
    fn audit_of_nothing_is_none() {
        assert!(audit_draws(&[]).is_none());
    }

    #[test]
    fn empty_population_is_vacuously_uniform() {
        let fit = chi_square_uniform(&[], BACK_MAX);
        assert_eq!(fit.chi2, 0.0);
        assert_eq!(fit.p_value, 1.0);
        assert_eq!(fit.conclusion(), CONCLUSION_UNIFORM);
    }
}
