//! Scan runner: fetch, backtest and evaluate every ticker of a list

use crate::config::Config;
use crate::gene_cache::GeneCache;
use crate::market_data::{MarketDataError, PriceFeed, PriceSource};
use crate::models::{AnalysisMode, GeneEntry, ScanMode, ScanOutcome, ScanRow, Sector, TickerReport};
use crate::watchlist::WatchlistStore;
use anyhow::Result;
use chrono::Utc;
use chrono_tz::Asia::Taipei;
use futures::stream::{self, StreamExt};
use hunter_core::analysis::evaluate;
use hunter_core::backtest::{select_best_window, BacktestEngine, BacktestReport};
use hunter_core::data::CandleSeries;
use hunter_core::EngineError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a single ticker could not be analysed
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0}")]
    MarketData(#[from] MarketDataError),
    #[error("downloaded data is empty")]
    EmptyData,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Scan time shown on the report, in Taipei time
pub fn scan_timestamp() -> String {
    Utc::now()
        .with_timezone(&Taipei)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

/// Per-ticker analysis result before it is split into row and cache entry
struct TickerOutcome {
    row: ScanRow,
    gene: Option<GeneEntry>,
}

pub struct Scanner {
    config: Arc<Config>,
    store: WatchlistStore,
    source: Arc<dyn PriceSource>,
    engine: BacktestEngine,
}

impl Scanner {
    pub fn new(config: Arc<Config>, source: Arc<dyn PriceSource>) -> Self {
        Self {
            store: WatchlistStore::new(&config),
            engine: BacktestEngine::new(config.backtest.clone()),
            config,
            source,
        }
    }

    pub fn store(&self) -> &WatchlistStore {
        &self.store
    }

    pub fn max_workers(&self) -> usize {
        self.config.max_workers.max(1)
    }

    /// Run one scan. Per-ticker failures become rows; only file I/O errors abort.
    pub async fn run(&self, mode: ScanMode) -> Result<ScanOutcome> {
        self.store.ensure_files()?;
        GeneCache::ensure_file(&self.config.gene_cache_file)?;

        let scan_time = scan_timestamp();
        let analysis_mode = mode.analysis_mode();
        let tickers = self.store.tickers(mode.is_market_scan())?;
        info!(
            "Scan {} started: {} tickers, {} analysis",
            mode,
            tickers.len(),
            analysis_mode.as_str()
        );

        if tickers.is_empty() {
            return Ok(ScanOutcome {
                rows: Vec::new(),
                scan_time,
                analysis_mode,
            });
        }

        // an unreadable cache is never written back, or earlier genes would be lost
        let (mut cache, cache_writable) = match GeneCache::load(&self.config.gene_cache_file) {
            Ok(cache) => (cache, true),
            Err(e) => {
                warn!("Gene cache unreadable, starting empty: {:#}", e);
                (GeneCache::new(), false)
            }
        };

        let feed = match self.source.open_session() {
            Ok(feed) => feed,
            Err(e) => {
                error!("Market data session failed, aborting batch: {}", e);
                let message = e.to_string();
                let rows = tickers
                    .into_iter()
                    .map(|ticker| ScanRow::Failed {
                        ticker,
                        message: message.clone(),
                    })
                    .collect();
                return Ok(ScanOutcome {
                    rows,
                    scan_time,
                    analysis_mode,
                });
            }
        };

        let cache_ref = &cache;
        let feed_ref = &feed;
        let mut outcomes: Vec<(usize, TickerOutcome)> = stream::iter(tickers.into_iter().enumerate())
            .map(|(index, ticker)| async move {
                let outcome = self
                    .analyze_ticker(feed_ref.as_ref(), &ticker, analysis_mode, cache_ref)
                    .await;
                (index, outcome)
            })
            .buffer_unordered(self.max_workers())
            .collect()
            .await;

        // completion order is arbitrary; report in list order
        outcomes.sort_by_key(|(index, _)| *index);

        let mut rows = Vec::with_capacity(outcomes.len());
        let mut genes = Vec::new();
        for (_, outcome) in outcomes {
            rows.push(outcome.row);
            genes.extend(outcome.gene);
        }

        if !genes.is_empty() {
            if cache_writable {
                info!("Updating gene cache with {} new entries", genes.len());
                cache.merge(genes);
                cache.save(&self.config.gene_cache_file)?;
            } else {
                warn!(
                    "Gene cache left untouched, {} new entries discarded",
                    genes.len()
                );
            }
        }

        let outcome = ScanOutcome {
            rows,
            scan_time,
            analysis_mode,
        };
        info!(
            "Scan {} finished: {} rows, {} errors",
            mode,
            outcome.rows.len(),
            outcome.error_count()
        );
        Ok(outcome)
    }

    async fn analyze_ticker(
        &self,
        feed: &dyn PriceFeed,
        ticker: &str,
        analysis_mode: AnalysisMode,
        cache: &GeneCache,
    ) -> TickerOutcome {
        info!("Fetching data for {}", ticker);
        match self.try_analyze(feed, ticker, analysis_mode, cache).await {
            Ok((report, gene)) => TickerOutcome {
                row: ScanRow::Success(report),
                gene,
            },
            Err(e) => {
                error!("Analysis failed for {}: {}", ticker, e);
                TickerOutcome {
                    row: ScanRow::Failed {
                        ticker: ticker.to_string(),
                        message: e.to_string(),
                    },
                    gene: None,
                }
            }
        }
    }

    async fn try_analyze(
        &self,
        feed: &dyn PriceFeed,
        ticker: &str,
        analysis_mode: AnalysisMode,
        cache: &GeneCache,
    ) -> Result<(TickerReport, Option<GeneEntry>), ScanError> {
        let history = feed.history(ticker, analysis_mode.history_range()).await?;
        let series = CandleSeries::from_valid(history.candles);
        if series.is_empty() {
            return Err(ScanError::EmptyData);
        }

        let (window, fitness, gene) = match analysis_mode {
            AnalysisMode::Weekly => {
                let selection = select_best_window(&self.engine, &series.closes())?;
                debug!("{}", BacktestReport::new(ticker, &selection).format());
                // the cache stores one decimal; keep the row consistent with it
                let fitness = Some((selection.best.fitness_pct * 10.0).round() / 10.0);
                let gene = GeneEntry {
                    ticker: ticker.to_string(),
                    best_window: selection.best.window,
                    fitness,
                };
                (selection.best.window, fitness, Some(gene))
            }
            AnalysisMode::Daily => match cache.get(ticker) {
                Some(entry) => (entry.best_window, entry.fitness, None),
                None => (self.engine.config().default_window, None, None),
            },
        };

        let snapshot = evaluate(&series, window)?;
        let name = history.name.unwrap_or_else(|| ticker.to_string());

        let report = TickerReport {
            ticker: ticker.to_string(),
            name,
            sector: Sector::from_ticker(ticker),
            window,
            fitness,
            price: snapshot.last_price,
            target: snapshot.target,
            status: snapshot.status,
            signal: snapshot.signal,
        };
        Ok((report, gene))
    }

    /// `(ticker, name)` for every watchlist entry, falling back to the ticker
    pub async fn watchlist_names(&self, tickers: &[String]) -> Vec<(String, String)> {
        let feed = match self.source.open_session() {
            Ok(feed) => feed,
            Err(e) => {
                warn!("Name lookup skipped: {}", e);
                return tickers.iter().map(|t| (t.clone(), t.clone())).collect();
            }
        };

        let feed_ref = &feed;
        stream::iter(tickers.to_vec())
            .map(|ticker| async move {
                let name = match feed_ref.display_name(&ticker).await {
                    Ok(Some(name)) => name,
                    Ok(None) => ticker.clone(),
                    Err(e) => {
                        error!("Name lookup failed for {}: {}", ticker, e);
                        ticker.clone()
                    }
                };
                (ticker, name)
            })
            .buffered(self.max_workers())
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceHistory;
    use crate::models::HistoryRange;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};
    use hunter_core::analysis::{EntrySignal, TrendStatus};
    use hunter_core::data::Candle;
    use std::collections::HashMap;

    #[derive(Clone, Default)]
    struct FakeFeed {
        histories: HashMap<String, Vec<Candle>>,
        broken_session: bool,
    }

    impl PriceSource for FakeFeed {
        fn open_session(&self) -> Result<Arc<dyn PriceFeed>, MarketDataError> {
            if self.broken_session {
                return Err(MarketDataError::Session("proxy refused".to_string()));
            }
            Ok(Arc::new(self.clone()))
        }
    }

    #[async_trait]
    impl PriceFeed for FakeFeed {
        async fn history(
            &self,
            ticker: &str,
            _range: HistoryRange,
        ) -> Result<PriceHistory, MarketDataError> {
            match self.histories.get(ticker) {
                Some(candles) => Ok(PriceHistory {
                    candles: candles.clone(),
                    name: Some(format!("{} Corp", ticker)),
                }),
                None => Err(MarketDataError::Status(404)),
            }
        }

        async fn display_name(&self, ticker: &str) -> Result<Option<String>, MarketDataError> {
            if self.histories.contains_key(ticker) {
                Ok(Some(format!("{} Corp", ticker)))
            } else {
                Err(MarketDataError::Status(404))
            }
        }
    }

    fn wavy_candles(ticker: &str, count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let t = i as f64;
                let close = 100.0 + t * 0.05 + (t / 7.0).sin() * 6.0;
                Candle::new(
                    close - 0.3,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1000.0 + t,
                    DateTime::<Utc>::UNIX_EPOCH + Duration::days(i as i64),
                    ticker.to_string(),
                    "1d".to_string(),
                )
            })
            .collect()
    }

    fn scanner(dir: &tempfile::TempDir, feed: FakeFeed) -> Scanner {
        let mut config = Config::with_data_dir(dir.path());
        config.max_workers = 3;
        Scanner::new(Arc::new(config), Arc::new(feed))
    }

    fn feed(tickers: &[&str]) -> FakeFeed {
        FakeFeed {
            histories: tickers
                .iter()
                .map(|t| (t.to_string(), wavy_candles(t, 300)))
                .collect(),
            broken_session: false,
        }
    }

    #[tokio::test]
    async fn test_comment_only_watchlist_yields_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(&dir, feed(&["2330.TW"]));
        scanner.store().write_raw("# nothing here\n\n   \n").unwrap();

        let outcome = scanner.run(ScanMode::Daily).await.unwrap();
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.analysis_mode, AnalysisMode::Daily);
    }

    #[tokio::test]
    async fn test_weekly_scan_keeps_order_and_updates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(&dir, feed(&["2330.TW", "3481.TW", "2454.TW"]));
        scanner
            .store()
            .write_raw("2330.TW\nMISSING.TW\n3481.TW\n2454.TW\n")
            .unwrap();

        let outcome = scanner.run(ScanMode::Weekly).await.unwrap();
        let tickers: Vec<&str> = outcome.rows.iter().map(ScanRow::ticker).collect();
        assert_eq!(tickers, vec!["2330.TW", "MISSING.TW", "3481.TW", "2454.TW"]);
        assert_eq!(outcome.error_count(), 1);
        assert!(outcome.rows[1].is_failed());

        let cache = GeneCache::load(&dir.path().join("gene_cache.csv")).unwrap();
        assert_eq!(cache.len(), 3);
        assert!(cache.get("MISSING.TW").is_none());

        match &outcome.rows[0] {
            ScanRow::Success(report) => {
                let gene = cache.get("2330.TW").unwrap();
                assert_eq!(report.window, gene.best_window);
                assert_eq!(report.fitness, gene.fitness);
                assert_eq!(report.name, "2330.TW Corp");
                assert_eq!(report.sector, Sector::AiCore);
            }
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_cache_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_data_dir(dir.path());
        // a directory opens but cannot be read as CSV
        config.gene_cache_file = dir.path().join("genes");
        std::fs::create_dir_all(&config.gene_cache_file).unwrap();
        let scanner = Scanner::new(Arc::new(config), Arc::new(feed(&["2330.TW"])));
        scanner.store().write_raw("2330.TW\n").unwrap();

        let outcome = scanner.run(ScanMode::Weekly).await.unwrap();
        assert!(!outcome.rows[0].is_failed());
        assert!(dir.path().join("genes").is_dir());
    }

    #[tokio::test]
    async fn test_daily_scan_reads_cached_gene() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(&dir, feed(&["2330.TW", "2317.TW"]));
        scanner.store().write_raw("2330.TW\n2317.TW\n").unwrap();

        let mut cache = GeneCache::new();
        cache.insert(GeneEntry {
            ticker: "2330.TW".to_string(),
            best_window: 10,
            fitness: Some(42.5),
        });
        cache.save(&dir.path().join("gene_cache.csv")).unwrap();

        let outcome = scanner.run(ScanMode::QuickScan).await.unwrap();
        let reports: Vec<&TickerReport> = outcome
            .rows
            .iter()
            .filter_map(|r| match r {
                ScanRow::Success(report) => Some(report),
                ScanRow::Failed { .. } => None,
            })
            .collect();

        assert_eq!(reports.len(), 2);
        assert_eq!((reports[0].window, reports[0].fitness), (10, Some(42.5)));
        assert_eq!((reports[1].window, reports[1].fitness), (20, None));
    }

    #[tokio::test]
    async fn test_market_scan_reads_market_list() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(&dir, FakeFeed::default());

        let outcome = scanner.run(ScanMode::Market).await.unwrap();
        assert_eq!(outcome.rows.len(), crate::watchlist::DEFAULT_MARKET_LIST.len());
        assert_eq!(outcome.rows[0].ticker(), "^TWII");
    }

    #[tokio::test]
    async fn test_session_failure_fails_every_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let mut broken = feed(&["2330.TW"]);
        broken.broken_session = true;
        let scanner = scanner(&dir, broken);
        scanner.store().write_raw("2330.TW\n3481.TW\n").unwrap();

        let outcome = scanner.run(ScanMode::Weekly).await.unwrap();
        assert_eq!(outcome.rows.len(), 2);
        for row in &outcome.rows {
            match row {
                ScanRow::Failed { message, .. } => assert!(message.contains("proxy refused")),
                other => panic!("unexpected row {:?}", other),
            }
        }
        assert!(GeneCache::load(&dir.path().join("gene_cache.csv"))
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_empty_history_fails_per_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = feed(&["2330.TW"]);
        source.histories.insert("EMPTY".to_string(), Vec::new());
        let scanner = scanner(&dir, source);
        scanner.store().write_raw("EMPTY\n2330.TW\n").unwrap();

        let outcome = scanner.run(ScanMode::Daily).await.unwrap();
        match &outcome.rows[0] {
            ScanRow::Failed { message, .. } => assert_eq!(message, "downloaded data is empty"),
            other => panic!("unexpected row {:?}", other),
        }
        assert!(!outcome.rows[1].is_failed());
    }

    #[tokio::test]
    async fn test_daily_scan_with_long_cached_window_is_weak() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = feed(&[]);
        source
            .histories
            .insert("2330.TW".to_string(), wavy_candles("2330.TW", 42));
        let scanner = scanner(&dir, source);
        scanner.store().write_raw("2330.TW\n").unwrap();
        std::fs::write(
            dir.path().join("gene_cache.csv"),
            "ticker,best_p,fit\n2330.TW,60,12.3%\n",
        )
        .unwrap();

        for mode in [ScanMode::Daily, ScanMode::QuickScan] {
            let outcome = scanner.run(mode).await.unwrap();
            assert!(!outcome.has_errors());
            match &outcome.rows[0] {
                ScanRow::Success(report) => {
                    assert_eq!(report.window, 60);
                    assert_eq!(report.fitness, Some(12.3));
                    assert_eq!(report.status, TrendStatus::Weak);
                    assert_eq!(report.signal, EntrySignal::Watch);
                }
                other => panic!("unexpected row {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_watchlist_names_fall_back_to_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = scanner(&dir, feed(&["2330.TW"]));

        let names = scanner
            .watchlist_names(&["2330.TW".to_string(), "NOPE".to_string()])
            .await;
        assert_eq!(
            names,
            vec![
                ("2330.TW".to_string(), "2330.TW Corp".to_string()),
                ("NOPE".to_string(), "NOPE".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_timestamp_is_taipei() {
        let stamp = scan_timestamp();
        assert!(stamp.ends_with("CST"), "{}", stamp);
        assert_eq!(stamp.len(), "2024-01-01 00:00:00 CST".len());
    }
}
