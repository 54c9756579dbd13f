//! BlockCypher adapter. No range endpoint at all: one request per block
//! height. Kept as a tertiary source; its free tier throttles quickly.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use blocklotto_kernel::types::BlockRecord;

use super::{
    check_status, finalize_range, network_err, parse_timestamp, with_retry, RetryPolicy,
    SourceAdapter,
};
use crate::errors::SourceError;

pub struct BlockcypherAdapter {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Deserialize)]
struct ChainInfo {
    height: u64,
}

#[derive(Deserialize)]
struct RawBlock {
    height: u64,
    hash: String,
    time: String,
}

impl BlockcypherAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: RetryPolicy::short(),
        }
    }

    async fn request_tip(&self) -> Result<u64, SourceError> {
        let url = format!("{}/v1/btc/main", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(network_err)?;
        let info: ChainInfo = check_status(resp).await?.json().await.map_err(network_err)?;
        Ok(info.height)
    }

    async fn request_block(&self, height: u64) -> Result<BlockRecord, SourceError> {
        let url = format!("{}/v1/btc/main/blocks/{height}", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(network_err)?;
        let raw: RawBlock = check_status(resp).await?.json().await.map_err(network_err)?;
        Ok(BlockRecord {
            height: raw.height,
            hash: raw.hash,
            timestamp: parse_timestamp(&raw.time)?,
        })
    }
}

#[async_trait]
impl SourceAdapter for BlockcypherAdapter {
    fn name(&self) -> &'static str {
        "blockcypher"
    }

    async fn fetch_tip_height(&self) -> Result<u64, SourceError> {
        with_retry(&self.policy, "blockcypher", || self.request_tip()).await
    }

    async fn fetch_range(&self, start: u64, count: u64) -> Result<Vec<BlockRecord>, SourceError> {
        let mut blocks = Vec::with_capacity(count as usize);
        for height in start..start + count {
            let block = with_retry(&self.policy, "blockcypher", || {
                self.request_block(height)
            })
            .await?;
            blocks.push(block);
        }
        finalize_range(blocks, count)
    }
}
