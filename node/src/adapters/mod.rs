// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Upstream source adapters.
//!
//! Each adapter normalizes one provider's API to the same two calls and
//! hides its pagination quirk behind them. Transient network failures are
//! retried locally with exponential backoff; semantic (4xx) failures are
//! not. Every range result is validated (hash syntax, exact count) and
//! sorted ascending before it leaves the adapter.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use blocklotto_kernel::types::BlockRecord;
use blocklotto_kernel::validate::well_formed_hash;

use crate::errors::SourceError;

pub mod blockchair;
pub mod blockcypher;
pub mod mempool_space;

pub use blockchair::BlockchairAdapter;
pub use blockcypher::BlockcypherAdapter;
pub use mempool_space::MempoolSpaceAdapter;

/// The capability surface the oracle and the reconciler program against.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Current chain tip height as this provider sees it.
    async fn fetch_tip_height(&self) -> Result<u64, SourceError>;

    /// Exactly `count` blocks starting at `start`, ordered ascending.
    async fn fetch_range(&self, start: u64, count: u64) -> Result<Vec<BlockRecord>, SourceError>;
}

/// Bounded exponential backoff. Providers with aggressive rate limits get
/// the long preset (minutes), the rest the short one (seconds).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub floor: Duration,
    pub cap: Duration,
}

impl RetryPolicy {
    pub fn short() -> Self {
        Self {
            attempts: 3,
            floor: Duration::from_secs(4),
            cap: Duration::from_secs(10),
        }
    }

    pub fn long() -> Self {
        Self {
            attempts: 3,
            floor: Duration::from_secs(120),
            cap: Duration::from_secs(480),
        }
    }

    /// Delay before retrying after the given 1-based failed attempt:
    /// floor, then doubling, clamped to the cap.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt - 1).min(16);
        self.floor.saturating_mul(factor).min(self.cap)
    }
}

/// Runs `op` up to `policy.attempts` times. Only `SourceError::Network`
/// is retried; semantic errors surface on the first occurrence.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    source: &'static str,
    mut op: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(SourceError::Network(reason)) if attempt < policy.attempts => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    source,
                    attempt,
                    ?delay,
                    %reason,
                    "transient upstream failure, backing off"
                );
                metrics::counter!("blocklotto_source_retries_total", 1, "source" => source);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Dual-mode timestamp normalization: all-digit input is Unix epoch
/// seconds; anything else is parsed as a calendar timestamp and assumed
/// UTC when it carries no zone.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, SourceError> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = trimmed
            .parse()
            .map_err(|_| SourceError::TimestampParse(input.to_string()))?;
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .ok_or_else(|| SourceError::TimestampParse(input.to_string()));
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(zoned.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(SourceError::TimestampParse(input.to_string()))
}

/// Epoch-seconds variant for providers that ship numeric timestamps.
pub fn timestamp_from_epoch(secs: i64) -> Result<DateTime<Utc>, SourceError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| SourceError::TimestampParse(secs.to_string()))
}

/// Final gate on every adapter's range result: sort ascending, verify hash
/// syntax, verify the count matches exactly what was asked for.
pub fn finalize_range(
    mut blocks: Vec<BlockRecord>,
    requested: u64,
) -> Result<Vec<BlockRecord>, SourceError> {
    blocks.sort_by_key(|b| b.height);
    for block in &blocks {
        if !well_formed_hash(&block.hash) {
            return Err(SourceError::InvalidHashFormat(block.hash.clone()));
        }
    }
    if blocks.len() as u64 != requested {
        return Err(SourceError::IncompleteRange {
            requested,
            got: blocks.len() as u64,
        });
    }
    Ok(blocks)
}

/// Maps a `reqwest` outcome to the retryable/non-retryable split: 4xx is
/// semantic (never retried), everything else transient.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    if !status.is_success() {
        return Err(SourceError::Network(format!("upstream status {status}")));
    }
    Ok(response)
}

pub(crate) fn network_err(e: reqwest::Error) -> SourceError {
    SourceError::Network(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_seconds_parse_as_utc() {
        let ts = parse_timestamp("1700000000").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn rfc3339_keeps_its_zone() {
        let ts = parse_timestamp("2023-11-14T22:13:20+02:00").unwrap();
        assert_eq!(ts.timestamp(), 1_699_992_800);
    }

    #[test]
    fn naive_timestamps_are_assumed_utc() {
        let a = parse_timestamp("2023-11-14 22:13:20").unwrap();
        let b = parse_timestamp("2023-11-14T22:13:20").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.timestamp(), 1_700_000_000);
    }

    #[test]
    fn garbage_timestamp_is_an_error() {
        assert!(matches!(
            parse_timestamp("not a time"),
            Err(SourceError::TimestampParse(_))
        ));
        assert!(matches!(
            parse_timestamp(""),
            Err(SourceError::TimestampParse(_))
        ));
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let policy = RetryPolicy {
            attempts: 3,
            floor: Duration::from_secs(4),
            cap: Duration::from_secs(10),
        };
        assert_eq!(policy.delay(1), Duration::from_secs(4));
        assert_eq!(policy.delay(2), Duration::from_secs(8));
        assert_eq!(policy.delay(3), Duration::from_secs(10));

        let long = RetryPolicy::long();
        assert_eq!(long.delay(1), Duration::from_secs(120));
        assert_eq!(long.delay(2), Duration::from_secs(240));
        assert_eq!(long.delay(3), Duration::from_secs(480));
    }

    #[test]
    fn finalize_sorts_and_counts() {
        let mut blocks = blocklotto_persistence::fixtures::blocks(5..10);
        blocks.reverse();
        let out = finalize_range(blocks, 5).unwrap();
        assert!(out.windows(2).all(|p| p[0].height < p[1].height));

        let short = blocklotto_persistence::fixtures::blocks(5..9);
        assert!(matches!(
            finalize_range(short, 5),
            Err(SourceError::IncompleteRange { requested: 5, got: 4 })
        ));
    }

    #[test]
    fn finalize_rejects_malformed_hash() {
        let mut blocks = blocklotto_persistence::fixtures::blocks(0..2);
        blocks[1].hash = "XYZ".into();
        assert!(matches!(
            finalize_range(blocks, 2),
            Err(SourceError::InvalidHashFormat(_))
        ));
    }

    #[tokio::test]
    async fn retry_absorbs_transient_failures() {
        let policy = RetryPolicy {
            attempts: 3,
            floor: Duration::from_millis(1),
            cap: Duration::from_millis(2),
        };
        let mut calls = 0u32;
        let result = with_retry(&policy, "test", || {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt < 3 {
                    Err(SourceError::Network("flaky".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_attempt_ceiling() {
        let policy = RetryPolicy {
            attempts: 3,
            floor: Duration::from_millis(1),
            cap: Duration::from_millis(2),
        };
        let mut calls = 0u32;
        let result: Result<(), _> = with_retry(&policy, "test", || {
            calls += 1;
            async { Err(SourceError::Network("down".into())) }
        })
        .await;
        assert!(matches!(result, Err(SourceError::Network(_))));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn semantic_errors_are_not_retried() {
        let policy = RetryPolicy::short();
        let mut calls = 0u32;
        let result: Result<(), _> = with_retry(&policy, "test", || {
            calls += 1;
            async {
                Err(SourceError::Upstream {
                    status: 404,
                    body: "missing".into(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(SourceError::Upstream { status: 404, .. })));
        assert_eq!(calls, 1);
    }
}
