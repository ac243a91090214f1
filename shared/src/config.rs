use anyhow::Context;
use dotenv::dotenv;
use hunter_core::config::BacktestConfig;
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub watchlist_file: PathBuf,
    pub market_scan_list_file: PathBuf,
    pub gene_cache_file: PathBuf,
    pub bind_addr: String,
    pub max_workers: usize,
    pub http_timeout_secs: u64,
    pub market_data_base_url: String,
    pub http_proxy_url: Option<String>,
    pub user_agent: String,
    pub backtest: BacktestConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let data_dir = PathBuf::from(
            std::env::var("HUNTER_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );
        let file_or = |var: &str, name: &str| -> PathBuf {
            std::env::var(var)
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join(name))
        };

        Ok(Config {
            watchlist_file: file_or("WATCHLIST_FILE", "watchlist.txt"),
            market_scan_list_file: file_or("MARKET_SCAN_LIST_FILE", "market_scan_list.txt"),
            gene_cache_file: file_or("GENE_CACHE_FILE", "gene_cache.csv"),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string()),
            max_workers: parse_var("MAX_WORKERS", 10)?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", 20)?,
            market_data_base_url: std::env::var("MARKET_DATA_BASE_URL")
                .unwrap_or_else(|_| "https://query1.finance.yahoo.com".to_string()),
            http_proxy_url: std::env::var("HTTP_PROXY_URL").ok().filter(|s| !s.is_empty()),
            user_agent: std::env::var("USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            backtest: BacktestConfig::default(),
            data_dir,
        })
    }

    /// Configuration rooted at `data_dir` with every other setting at its default
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Config {
            watchlist_file: data_dir.join("watchlist.txt"),
            market_scan_list_file: data_dir.join("market_scan_list.txt"),
            gene_cache_file: data_dir.join("gene_cache.csv"),
            bind_addr: "0.0.0.0:8081".to_string(),
            max_workers: 10,
            http_timeout_secs: 20,
            market_data_base_url: "https://query1.finance.yahoo.com".to_string(),
            http_proxy_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            backtest: BacktestConfig::default(),
            data_dir,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
