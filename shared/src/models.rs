use crate::labels;
use hunter_core::analysis::{EntrySignal, TrendStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scan requested from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    Daily,
    Weekly,
    Market,
    MarketBacktest,
    QuickScan,
}

impl ScanMode {
    pub const ALL: [ScanMode; 5] = [
        ScanMode::Daily,
        ScanMode::Weekly,
        ScanMode::Market,
        ScanMode::MarketBacktest,
        ScanMode::QuickScan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Daily => "DAILY",
            ScanMode::Weekly => "WEEKLY",
            ScanMode::Market => "MARKET",
            ScanMode::MarketBacktest => "MARKET_BACKTEST",
            ScanMode::QuickScan => "QUICK_SCAN",
        }
    }

    /// Weekly modes re-run the backtest and refresh the gene cache
    pub fn analysis_mode(&self) -> AnalysisMode {
        match self {
            ScanMode::Weekly | ScanMode::MarketBacktest => AnalysisMode::Weekly,
            _ => AnalysisMode::Daily,
        }
    }

    /// Market modes read the market scan list instead of the watchlist
    pub fn is_market_scan(&self) -> bool {
        matches!(self, ScanMode::Market | ScanMode::MarketBacktest)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scan mode: {0}")]
pub struct UnknownScanMode(pub String);

impl FromStr for ScanMode {
    type Err = UnknownScanMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ScanMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == upper)
            .ok_or_else(|| UnknownScanMode(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    Daily,
    Weekly,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Daily => "DAILY",
            AnalysisMode::Weekly => "WEEKLY",
        }
    }

    /// History to download for this mode
    pub fn history_range(&self) -> HistoryRange {
        match self {
            AnalysisMode::Weekly => HistoryRange::FiveYears,
            AnalysisMode::Daily => HistoryRange::SixtyDays,
        }
    }
}

/// Daily-bar lookback requested from the market data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    SixtyDays,
    FiveYears,
}

impl HistoryRange {
    pub fn as_query(&self) -> &'static str {
        match self {
            HistoryRange::SixtyDays => "60d",
            HistoryRange::FiveYears => "5y",
        }
    }
}

/// Board group a ticker is tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Panel,
    Memory,
    HeavyElectric,
    AiCore,
    Hot,
}

impl Sector {
    pub fn from_ticker(ticker: &str) -> Self {
        match ticker_code(ticker) {
            "3481" | "2409" => Sector::Panel,
            "3260" | "2408" | "8299" => Sector::Memory,
            "1513" | "1519" | "1503" => Sector::HeavyElectric,
            "2330" | "2454" | "3017" | "2317" => Sector::AiCore,
            _ => Sector::Hot,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sector::Panel => "[面板]",
            Sector::Memory => "[記憶體]",
            Sector::HeavyElectric => "[重電]",
            Sector::AiCore => "[AI核心]",
            Sector::Hot => "[熱門]",
        }
    }
}

/// Exchange code without the market suffix ("2330.TW" -> "2330")
pub fn ticker_code(ticker: &str) -> &str {
    ticker.split('.').next().unwrap_or(ticker)
}

/// Successful analysis of one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
    pub ticker: String,
    /// Company name as reported by the data source
    pub name: String,
    pub sector: Sector,
    /// Moving-average window (the ticker's gene)
    pub window: usize,
    /// Backtest return in percent, when known
    pub fitness: Option<f64>,
    pub price: f64,
    pub target: f64,
    pub status: TrendStatus,
    pub signal: EntrySignal,
}

impl TickerReport {
    /// "[AI核心]台積電(2330)"
    pub fn display_name(&self) -> String {
        format!("{}{}", self.sector.label(), self.short_name())
    }

    /// "台積電(2330)"
    pub fn short_name(&self) -> String {
        format!("{}({})", self.name, ticker_code(&self.ticker))
    }

    pub fn window_label(&self) -> String {
        format!("{}d", self.window)
    }

    pub fn fitness_label(&self) -> String {
        format_fitness(self.fitness)
    }

    pub fn price_label(&self) -> String {
        format!("{:.1}", self.price)
    }

    pub fn target_label(&self) -> String {
        format!("{:.2}", self.target)
    }
}

/// One line of a scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanRow {
    Success(TickerReport),
    Failed { ticker: String, message: String },
}

impl ScanRow {
    pub fn ticker(&self) -> &str {
        match self {
            ScanRow::Success(report) => &report.ticker,
            ScanRow::Failed { ticker, .. } => ticker,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScanRow::Failed { .. })
    }

    pub fn fitness(&self) -> Option<f64> {
        match self {
            ScanRow::Success(report) => report.fitness,
            ScanRow::Failed { .. } => None,
        }
    }

    /// Name column: the display name, or the failure marker
    pub fn name_label(&self) -> String {
        match self {
            ScanRow::Success(report) => report.display_name(),
            ScanRow::Failed { ticker, .. } => format!("{}: {}", labels::FAILED_NAME_PREFIX, ticker),
        }
    }
}

/// Result of one scan run
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub rows: Vec<ScanRow>,
    pub scan_time: String,
    pub analysis_mode: AnalysisMode,
}

impl ScanOutcome {
    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_failed()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.rows.iter().any(ScanRow::is_failed)
    }
}

/// Cached best window and fitness for a ticker
#[derive(Debug, Clone, PartialEq)]
pub struct GeneEntry {
    pub ticker: String,
    pub best_window: usize,
    pub fitness: Option<f64>,
}

/// "12.3%" or "N/A"
pub fn format_fitness(fitness: Option<f64>) -> String {
    match fitness {
        Some(value) => format!("{:.1}%", value),
        None => labels::NOT_AVAILABLE.to_string(),
    }
}

/// Inverse of [`format_fitness`]; anything unparseable reads as unknown
pub fn parse_fitness(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_mode_parse_is_case_insensitive() {
        assert_eq!("daily".parse::<ScanMode>().unwrap(), ScanMode::Daily);
        assert_eq!(
            "Market_Backtest".parse::<ScanMode>().unwrap(),
            ScanMode::MarketBacktest
        );
        assert_eq!("QUICK_SCAN".parse::<ScanMode>().unwrap(), ScanMode::QuickScan);
        assert_eq!(
            "MARKET_FOO".parse::<ScanMode>().unwrap_err().to_string(),
            "unknown scan mode: MARKET_FOO"
        );
    }

    #[test]
    fn test_mode_routing() {
        assert_eq!(ScanMode::MarketBacktest.analysis_mode(), AnalysisMode::Weekly);
        assert_eq!(ScanMode::Weekly.analysis_mode(), AnalysisMode::Weekly);
        assert_eq!(ScanMode::Market.analysis_mode(), AnalysisMode::Daily);
        assert_eq!(ScanMode::QuickScan.analysis_mode(), AnalysisMode::Daily);

        assert!(ScanMode::Market.is_market_scan());
        assert!(ScanMode::MarketBacktest.is_market_scan());
        assert!(!ScanMode::Weekly.is_market_scan());

        assert_eq!(AnalysisMode::Weekly.history_range().as_query(), "5y");
        assert_eq!(AnalysisMode::Daily.history_range().as_query(), "60d");
    }

    #[test]
    fn test_sector_from_ticker() {
        assert_eq!(Sector::from_ticker("2330.TW"), Sector::AiCore);
        assert_eq!(Sector::from_ticker("3260.TWO"), Sector::Memory);
        assert_eq!(Sector::from_ticker("1513.TW"), Sector::HeavyElectric);
        assert_eq!(Sector::from_ticker("2409.TW"), Sector::Panel);
        assert_eq!(Sector::from_ticker("^TWII"), Sector::Hot);
        assert_eq!(Sector::from_ticker("AAPL"), Sector::Hot);
    }

    #[test]
    fn test_fitness_format_roundtrip() {
        assert_eq!(format_fitness(Some(12.345)), "12.3%");
        assert_eq!(format_fitness(Some(-4.0)), "-4.0%");
        assert_eq!(format_fitness(None), "N/A");
        assert_eq!(parse_fitness("12.3%"), Some(12.3));
        assert_eq!(parse_fitness("N/A"), None);
        assert_eq!(parse_fitness(""), None);
    }

    #[test]
    fn test_display_name() {
        let report = TickerReport {
            ticker: "2330.TW".to_string(),
            name: "TSMC".to_string(),
            sector: Sector::AiCore,
            window: 20,
            fitness: None,
            price: 1000.0,
            target: 1100.0,
            status: TrendStatus::Strong,
            signal: EntrySignal::Watch,
        };
        assert_eq!(report.display_name(), "[AI核心]TSMC(2330)");
        assert_eq!(report.window_label(), "20d");
        assert_eq!(report.price_label(), "1000.0");
    }
}
