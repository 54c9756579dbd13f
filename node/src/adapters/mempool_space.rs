//! mempool.space adapter. The blocks endpoint only serves descending
//! pages anchored at a height, so ranges are assembled by walking page
//! anchors in steps of 14 and keeping the heights still wanted.

use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use blocklotto_kernel::types::BlockRecord;

use super::{
    check_status, finalize_range, network_err, timestamp_from_epoch, with_retry, RetryPolicy,
    SourceAdapter,
};
use crate::errors::SourceError;

/// Page stride of `/api/v1/blocks/{anchor}`.
const BLOCKS_STEP: u64 = 14;

pub struct MempoolSpaceAdapter {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Deserialize)]
pub(crate) struct RawBlock {
    /// The block hash; the provider calls it `id`.
    pub(crate) id: String,
    pub(crate) height: u64,
    /// Unix epoch seconds.
    pub(crate) timestamp: i64,
}

/// Keeps the page's blocks whose heights are still wanted, removing each
/// satisfied height from the set.
pub(crate) fn take_wanted(
    page: Vec<RawBlock>,
    wanted: &mut BTreeSet<u64>,
) -> Result<Vec<BlockRecord>, SourceError> {
    let mut kept = Vec::new();
    for raw in page {
        if wanted.remove(&raw.height) {
            kept.push(BlockRecord {
                height: raw.height,
                hash: raw.id,
                timestamp: timestamp_from_epoch(raw.timestamp)?,
            });
        }
    }
    Ok(kept)
}

impl MempoolSpaceAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy: RetryPolicy::short(),
        }
    }

    async fn request_tip(&self) -> Result<u64, SourceError> {
        let url = format!("{}/api/blocks/tip/height", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(network_err)?;
        let text = check_status(resp).await?.text().await.map_err(network_err)?;
        text.trim()
            .parse()
            .map_err(|_| SourceError::Network(format!("unparseable tip height: {text:?}")))
    }

    async fn request_page(&self, anchor: u64) -> Result<Vec<RawBlock>, SourceError> {
        let url = format!("{}/api/v1/blocks/{anchor}", self.base_url);
        let resp = self.client.get(&url).send().await.map_err(network_err)?;
        check_status(resp).await?.json().await.map_err(network_err)
    }
}

#[async_trait]
impl SourceAdapter for MempoolSpaceAdapter {
    fn name(&self) -> &'static str {
        "mempool_space"
    }

    async fn fetch_tip_height(&self) -> Result<u64, SourceError> {
        with_retry(&self.policy, "mempool_space", || self.request_tip()).await
    }

    async fn fetch_range(&self, start: u64, count: u64) -> Result<Vec<BlockRecord>, SourceError> {
        let mut wanted: BTreeSet<u64> = (start..start + count).collect();
        let mut blocks = Vec::with_capacity(count as usize);

        let mut anchor = start;
        while anchor < start + count {
            let page = with_retry(&self.policy, "mempool_space", || {
                self.request_page(anchor + BLOCKS_STEP)
            })
            .await?;
            blocks.extend(take_wanted(page, &mut wanted)?);
            anchor += BLOCKS_STEP;
        }

        finalize_range(blocks, count)
    }
}
