//! Gene cache: best window and fitness per ticker, stored as CSV

use crate::models::{format_fitness, parse_fitness, GeneEntry};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize)]
struct GeneRecord {
    ticker: String,
    best_p: usize,
    fit: String,
}

/// In-memory view of the gene cache file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneCache {
    entries: BTreeMap<String, GeneEntry>,
}

impl GeneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache; a missing or empty file is an empty cache
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", path.display()))
            }
        };

        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
        let mut cache = Self::new();
        for result in reader.deserialize::<GeneRecord>() {
            match result {
                Ok(record) => cache.insert(GeneEntry {
                    fitness: parse_fitness(&record.fit),
                    best_window: record.best_p,
                    ticker: record.ticker,
                }),
                Err(e) if e.is_io_error() => {
                    return Err(e).with_context(|| format!("Failed to read {}", path.display()))
                }
                Err(e) => warn!("Skipping malformed gene cache row in {}: {}", path.display(), e),
            }
        }

        Ok(cache)
    }

    /// Write the whole cache, header included
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = File::create(path).context("Failed to create gene cache file")?;
        let mut writer = Writer::from_writer(file);

        // serialize() only emits a header once a row is written
        writer.write_record(["ticker", "best_p", "fit"])?;
        for entry in self.entries.values() {
            writer.write_record([
                entry.ticker.clone(),
                entry.best_window.to_string(),
                format_fitness(entry.fitness),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Create an empty cache file with just the header
    pub fn ensure_file(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        info!("Creating empty gene cache at {}", path.display());
        Self::new().save(path)
    }

    pub fn get(&self, ticker: &str) -> Option<&GeneEntry> {
        self.entries.get(ticker)
    }

    pub fn insert(&mut self, entry: GeneEntry) {
        self.entries.insert(entry.ticker.clone(), entry);
    }

    /// Merge fresh entries; the newest entry for a ticker wins
    pub fn merge(&mut self, entries: impl IntoIterator<Item = GeneEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
