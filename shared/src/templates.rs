use crate::models::ScanMode;
use crate::report::{ReportRow, ReportTable};
use askama::Template;

/// Build stamp shown in every page footer
pub fn build_label() -> String {
    format!(
        "v{} ({}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("PROFILE")
    )
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub build: String,
}

impl IndexTemplate {
    pub fn new() -> Self {
        Self {
            build: build_label(),
        }
    }
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub mode: String,
    pub headers: Vec<&'static str>,
    pub rows: Vec<ReportRow>,
    pub report_info: String,
    pub scan_time: String,
    pub error_flag: bool,
    pub build: String,
}

impl ResultsTemplate {
    pub fn new(mode: ScanMode, table: ReportTable, scan_time: String) -> Self {
        Self {
            mode: mode.as_str().to_string(),
            headers: table.headers,
            rows: table.rows,
            report_info: table.report_info,
            scan_time,
            error_flag: table.error_flag,
            build: build_label(),
        }
    }
}

#[derive(Template)]
#[template(path = "watchlist.html")]
pub struct WatchlistTemplate {
    pub content: String,
    /// `(ticker, name)` pairs in list order
    pub ticker_details: Vec<(String, String)>,
    pub build: String,
}

impl WatchlistTemplate {
    pub fn new(content: String, ticker_details: Vec<(String, String)>) -> Self {
        Self {
            content,
            ticker_details,
            build: build_label(),
        }
    }
}

#[derive(Template)]
#[template(path = "watchlist_select.html")]
pub struct WatchlistSelectTemplate {
    pub build: String,
}

impl WatchlistSelectTemplate {
    pub fn new() -> Self {
        Self {
            build: build_label(),
        }
    }
}

impl Default for WatchlistSelectTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisMode, ScanOutcome, ScanRow};
    use crate::report::build_table;

    #[test]
    fn test_results_page_escapes_messages() {
        let outcome = ScanOutcome {
            rows: vec![ScanRow::Failed {
                ticker: "BAD".to_string(),
                message: "<script>alert(1)</script>".to_string(),
            }],
            scan_time: "2024-01-05 09:30:00 CST".to_string(),
            analysis_mode: AnalysisMode::Daily,
        };
        let table = build_table(&outcome, ScanMode::Daily);
        let html = ResultsTemplate::new(ScanMode::Daily, table, outcome.scan_time.clone())
            .render()
            .unwrap();

        assert!(html.contains("DAILY"));
        assert!(html.contains("2024-01-05 09:30:00 CST"));
        assert!(html.contains("分析失敗: BAD"));
        assert!(!html.contains("<script>alert(1)</script>"));
    }

    #[test]
    fn test_watchlist_page_lists_names() {
        let html = WatchlistTemplate::new(
            "2330.TW\n".to_string(),
            vec![("2330.TW".to_string(), "TSMC".to_string())],
        )
        .render()
        .unwrap();

        assert!(html.contains("name=\"watchlist_content\""));
        assert!(html.contains("TSMC"));
    }

    #[test]
    fn test_static_pages_render() {
        assert!(IndexTemplate::new().render().unwrap().contains("/run/MARKET_BACKTEST"));
        assert!(WatchlistSelectTemplate::new()
            .render()
            .unwrap()
            .contains("/run/QUICK_SCAN"));
    }
}
