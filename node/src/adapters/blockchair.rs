//! Blockchair adapter. The `/bitcoin/blocks` endpoint is queried with an
//! explicit ascending-id filter; the provider rate-limits hard, so this
//! adapter carries the long backoff preset.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use blocklotto_kernel::types::BlockRecord;

use super::{
    check_status, finalize_range, network_err, parse_timestamp, with_retry, RetryPolicy,
    SourceAdapter,
};
use crate::errors::SourceError;

pub struct BlockchairAdapter {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Deserialize)]
struct StatsResponse {
    data: StatsData,
}

#[derive(Deserialize)]
struct StatsData {
    blocks: u64,
}

#[derive(Deserialize)]
struct BlocksResponse {
    data: Vec<RawBlock>,
}

#[derive(Deserialize)]
pub(crate) struct RawBlock {
    pub(crate) id: u64,
    pub(crate) hash: String,
    pub(crate) time: String,
}

/// Normalizes the provider payload, keeping only heights at or above
/// `start` (the id-filter query can return the boundary block twice on
/// pagination edges).
pub(crate) fn normalize_blocks(
    raw: Vec<RawBlock>,
    start: u64,
) -> Result<Vec<BlockRecord>, SourceError> {
    raw.into_iter()
        .filter(|b| b.id >= start)
        .map(|b| {
            Ok(BlockRecord {
                height: b.id,
                hash: b.hash,
                timestamp: parse_timestamp(&b.time)?,
            })
        })
        .collect()
}

impl BlockchairAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: RetryPolicy::long(),
        }
    }

    async fn request_tip(&self) -> Result<u64, SourceError> {
        let url = format!("{}/bitcoin/stats", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(network_err)?;
        let stats: StatsResponse = check_status(resp).await?.json().await.map_err(network_err)?;
        // `blocks` counts blocks; the tip height is one less.
        Ok(stats.data.blocks.saturating_sub(1))
    }

    async fn request_range(&self, start: u64, count: u64) -> Result<Vec<BlockRecord>, SourceError> {
        let url = format!("{}/bitcoin/blocks", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("limit", count.to_string()),
                ("s", "id(asc)".to_string()),
                ("q", format!("id({start}..)")),
            ])
            .send()
            .await
            .map_err(network_err)?;
        let body: BlocksResponse = check_status(resp).await?.json().await.map_err(network_err)?;
        normalize_blocks(body.data, start)
    }
}

#[async_trait]
impl SourceAdapter for BlockchairAdapter {
    fn name(&self) -> &'static str {
        "blockchair"
    }

    async fn fetch_tip_height(&self) -> Result<u64, SourceError> {
        with_retry(&self.policy, "blockchair", || self.request_tip()).await
    }

    async fn fetch_range(&self, start: u64, count: u64) -> Result<Vec<BlockRecord>, SourceError> {
        let blocks =
            with_retry(&self.policy, "blockchair", || self.request_range(start, count)).await?;
        finalize_range(blocks, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: u64) -> RawBlock {
        RawBlock {
            id,
            hash: format!("{id:064x}"),
            time: "2023-11-14 22:13:20".into(),
        }
    }

    #[test]
    fn normalize_drops_heights_below_start() {
        let blocks = normalize_blocks(vec![raw(99), raw(100), raw(101)], 100).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].height, 100);
    }

    #[test]
    fn normalize_propagates_timestamp_errors() {
        let mut bad = raw(5);
        bad.time = "???".into();
        assert!(matches!(
            normalize_blocks(vec![bad], 0),
            Err(SourceError::TimestampParse(_))
        ));
    }
}
