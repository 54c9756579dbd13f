use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the ledger's append-only logs.
    pub data_dir: PathBuf,
    /// Largest block batch per append.
    pub batch_cap: u64,
    /// Period of the automatic ingest cycle.
    pub poll_interval_secs: u64,
    pub blockchair_url: String,
    pub mempool_url: String,
    pub blockcypher_url: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_dir: PathBuf::from("./data"),
            batch_cap: 100,
            poll_interval_secs: 600,
            blockchair_url: "https://api.blockchair.com".into(),
            mempool_url: "https://mempool.space".into(),
            blockcypher_url: "https://api.blockcypher.com".into(),
        }
    }
}

impl NodeConfig {
    /// Defaults with `BLOCKLOTTO_*` environment overrides.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("BLOCKLOTTO_BIND_ADDR") {
            if let Ok(addr) = v.parse() {
                cfg.bind_addr = addr;
            }
        }
        if let Ok(v) = std::env::var("BLOCKLOTTO_DATA_DIR") {
            cfg.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BLOCKLOTTO_BATCH_CAP") {
            if let Ok(cap) = v.parse() {
                cfg.batch_cap = cap;
            }
        }
        if let Ok(v) = std::env::var("BLOCKLOTTO_POLL_INTERVAL_SECS") {
            if let Ok(secs) = v.parse() {
                cfg.poll_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("BLOCKLOTTO_BLOCKCHAIR_URL") {
            cfg.blockchair_url = v;
        }
        if let Ok(v) = std::env::var("BLOCKLOTTO_MEMPOOL_URL") {
            cfg.mempool_url = v;
        }
        if let Ok(v) = std::env::var("BLOCKLOTTO_BLOCKCYPHER_URL") {
            cfg.blockcypher_url = v;
        }
        cfg
    }
}
