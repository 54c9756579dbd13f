// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
//! Height oracle: the most conservative tip all sources agree exists.

use std::sync::Arc;

use futures::future::join_all;

use crate::adapters::SourceAdapter;
use crate::errors::NodeError;

pub struct HeightOracle {
    sources: Vec<Arc<dyn SourceAdapter>>,
}

impl HeightOracle {
    pub fn new(sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self { sources }
    }

    /// Queries every source concurrently and returns the minimum of the
    /// successful answers. Individual source failures are logged and
    /// tolerated; only when every source fails is the call an error.
    pub async fn current_tip_height(&self) -> Result<u64, NodeError> {
        let tips = join_all(self.sources.iter().map(|s| async move {
            (s.name(), s.fetch_tip_height().await)
        }))
        .await;

        let mut best: Option<u64> = None;
        for (name, outcome) in tips {
            match outcome {
                Ok(tip) => {
                    tracing::debug!(source = name, tip, "tip height reported");
                    best = Some(best.map_or(tip, |b| b.min(tip)));
                }
                Err(e) => {
                    tracing::warn!(source = name, error = %e, "tip height unavailable");
                }
            }
        }
        best.ok_or(NodeError::NoHeightAvailable)
    }
}
