//! Ticker list files (watchlist and market scan list)

use crate::config::Config;
use crate::labels;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Seed for a missing market scan list
pub const DEFAULT_MARKET_LIST: [&str; 11] = [
    "^TWII", "3481.TW", "2409.TW", "3260.TWO", "2408.TW", "1513.TW", "1519.TW", "2330.TW",
    "2317.TW", "3017.TW", "2454.TW",
];

/// Tickers in a newline-delimited list; blank lines and `#` comments are skipped.
pub fn parse_tickers(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Flat-file store for the two ticker lists and the data directory
#[derive(Debug, Clone)]
pub struct WatchlistStore {
    data_dir: PathBuf,
    watchlist_file: PathBuf,
    market_list_file: PathBuf,
}

impl WatchlistStore {
    pub fn new(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            watchlist_file: config.watchlist_file.clone(),
            market_list_file: config.market_scan_list_file.clone(),
        }
    }

    /// Create the data directory and seed any missing list
    pub fn ensure_files(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create {}", self.data_dir.display()))?;
        seed_if_missing(&self.market_list_file, &DEFAULT_MARKET_LIST.join("\n"))?;
        seed_if_missing(&self.watchlist_file, labels::WATCHLIST_PLACEHOLDER)?;
        Ok(())
    }

    pub fn read_raw(&self) -> Result<String> {
        self.ensure_files()?;
        read_list(&self.watchlist_file)
    }

    /// Replace the watchlist with user-supplied text
    pub fn write_raw(&self, content: &str) -> Result<()> {
        self.ensure_files()?;
        fs::write(&self.watchlist_file, content)
            .with_context(|| format!("Failed to write {}", self.watchlist_file.display()))?;
        info!("Watchlist saved ({} tickers)", parse_tickers(content).len());
        Ok(())
    }

    /// Tickers from the market list or the watchlist
    pub fn tickers(&self, market: bool) -> Result<Vec<String>> {
        self.ensure_files()?;
        let path = if market {
            &self.market_list_file
        } else {
            &self.watchlist_file
        };
        Ok(parse_tickers(&read_list(path)?))
    }
}

fn read_list(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn seed_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to seed {}", path.display()))?;
    info!("Created {}", path.display());
    Ok(())
}
