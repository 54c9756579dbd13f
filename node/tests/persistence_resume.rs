mod common;

use std::sync::Arc;

use tempfile::tempdir;
use tokio::sync::Mutex;

use blocklotto_node::ingest::{IngestOutcome, Ingestor, SharedLedger};
use blocklotto_node::oracle::HeightOracle;
use blocklotto_node::reconcile::RangeFetcher;
use blocklotto_persistence::FileLedger;

use common::MockAdapter;

fn ingestor(tip: u64, ledger: &SharedLedger) -> Ingestor {
    let primary = Arc::new(MockAdapter::new("primary", tip));
    let secondary = Arc::new(MockAdapter::new("secondary", tip));
    let oracle = HeightOracle::new(vec![primary.clone(), secondary.clone()]);
    let fetcher = RangeFetcher::new(primary, vec![secondary]);
    Ingestor::new(oracle, fetcher, ledger.clone(), 100)
}

#[tokio::test]
async fn ingestion_resumes_across_restarts() {
    let dir = tempdir().unwrap();

    {
        let ledger: SharedLedger =
            Arc::new(Mutex::new(FileLedger::open(dir.path()).unwrap()));
        let report = ingestor(100, &ledger).run().await.unwrap();
        assert_eq!(report.blocks_ingested, 101);
    }

    // "Restart": reopen the ledger from disk and catch up to a new tip.
    let ledger: SharedLedger = Arc::new(Mutex::new(FileLedger::open(dir.path()).unwrap()));
    assert_eq!(ledger.lock().await.max_persisted_height(), Some(100));

    let report = ingestor(150, &ledger).run().await.unwrap();
    assert_eq!(report.outcome, IngestOutcome::CaughtUp);
    assert_eq!(report.blocks_ingested, 50);
    assert_eq!(ledger.lock().await.max_persisted_height(), Some(150));
}
