// Copyright (c) 2026 blocklotto contributors. Licensed under AGPLv3.
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Mutex;

use blocklotto_node::adapters::{
    BlockchairAdapter, MempoolSpaceAdapter, SourceAdapter,
};
use blocklotto_node::config::NodeConfig;
use blocklotto_node::draws;
use blocklotto_node::ingest::{Ingestor, SharedLedger};
use blocklotto_node::oracle::HeightOracle;
use blocklotto_node::reconcile::RangeFetcher;
use blocklotto_node::server::{build_router, AppState};
use blocklotto_node::telemetry;
use blocklotto_persistence::FileLedger;

#[tokio::main]
async fn main() {
    telemetry::init_telemetry();

    let cfg = NodeConfig::from_env();
    tracing::info!(?cfg, "starting blocklotto node");

    let ledger = match FileLedger::open(&cfg.data_dir) {
        Ok(ledger) => ledger,
        Err(e) => {
            tracing::error!(error = %e, dir = ?cfg.data_dir, "cannot open ledger");
            std::process::exit(1);
        }
    };
    tracing::info!(
        watermark = ?blocklotto_persistence::LedgerStore::max_persisted_height(&ledger),
        "ledger opened"
    );
    let ledger: SharedLedger = Arc::new(Mutex::new(ledger));

    let client = reqwest::Client::new();
    let blockchair: Arc<dyn SourceAdapter> =
        Arc::new(BlockchairAdapter::new(client.clone(), &cfg.blockchair_url));
    let mempool: Arc<dyn SourceAdapter> =
        Arc::new(MempoolSpaceAdapter::new(client.clone(), &cfg.mempool_url));

    // Blockchair is authoritative; mempool.space cross-checks and feeds
    // the tip oracle. The blockcypher adapter exists but its free tier
    // throttles too hard for steady polling.
    let oracle = HeightOracle::new(vec![blockchair.clone(), mempool.clone()]);
    let fetcher = RangeFetcher::new(blockchair, vec![mempool]);
    let ingestor = Arc::new(Ingestor::new(oracle, fetcher, ledger.clone(), cfg.batch_cap));

    // Periodic driver: one cycle per interval tick. The cycle owns no
    // retry logic of its own; a failed cycle just waits for the next tick.
    {
        let ledger = ledger.clone();
        let ingestor = ingestor.clone();
        let period = tokio::time::Duration::from_secs(cfg.poll_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match draws::run_cycle(&ingestor, &ledger).await {
                    Ok(report) => {
                        tracing::info!(
                            outcome = ?report.outcome,
                            blocks = report.blocks_ingested,
                            "cycle finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "cycle failed, waiting for next tick");
                    }
                }
            }
        });
    }

    let app = build_router(AppState { ledger, ingestor });

    tracing::info!(addr = %cfg.bind_addr, "listening");
    let listener = TcpListener::bind(cfg.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
