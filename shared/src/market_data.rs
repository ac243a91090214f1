//! Market data client
//!
//! Daily OHLCV history and display names from the Yahoo Finance chart API.

use crate::config::Config;
use crate::models::HistoryRange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hunter_core::data::Candle;
use serde::Deserialize;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("failed to set up HTTP session: {0}")]
    Session(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("data source returned HTTP {0}")]
    Status(u16),
    #[error("data source error: {code} - {description}")]
    Api { code: String, description: String },
    #[error("no data returned for {0}")]
    NoData(String),
}

/// Downloaded history plus the name reported alongside it
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub candles: Vec<Candle>,
    pub name: Option<String>,
}

/// Source of per-batch sessions. Failing to open one fails the whole batch.
pub trait PriceSource: Send + Sync {
    fn open_session(&self) -> Result<Arc<dyn PriceFeed>, MarketDataError>;
}

/// A live session that serves per-ticker requests
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn history(
        &self,
        ticker: &str,
        range: HistoryRange,
    ) -> Result<PriceHistory, MarketDataError>;

    /// Long name, else short name, as reported by the source
    async fn display_name(&self, ticker: &str) -> Result<Option<String>, MarketDataError>;
}

// Yahoo Finance chart API response structures

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "shortName")]
    short_name: Option<String>,
}

impl ChartMeta {
    fn name(self) -> Option<String> {
        self.long_name
            .into_iter()
            .chain(self.short_name)
            .map(|n| n.trim().to_string())
            .find(|n| !n.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Factory for Yahoo sessions built from [`Config`]
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    user_agent: String,
    timeout: Duration,
    proxy_url: Option<String>,
}

impl YahooClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.market_data_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.http_timeout_secs),
            proxy_url: config.http_proxy_url.clone(),
        }
    }
}

impl PriceSource for YahooClient {
    fn open_session(&self) -> Result<Arc<dyn PriceFeed>, MarketDataError> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| MarketDataError::Session(format!("base URL {}: {}", self.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(MarketDataError::Session(format!(
                "base URL {} cannot carry a path",
                self.base_url
            )));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout);

        if let Some(proxy_url) = &self.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| MarketDataError::Session(format!("proxy {}: {}", proxy_url, e)))?;
            builder = builder.proxy(proxy);
            info!("Market data session routed through proxy {}", proxy_url);
        }

        let client = builder
            .build()
            .map_err(|e| MarketDataError::Session(e.to_string()))?;

        Ok(Arc::new(YahooSession { client, base_url }))
    }
}

struct YahooSession {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooSession {
    async fn chart(&self, ticker: &str, range: &str) -> Result<ChartData, MarketDataError> {
        let url = chart_url(&self.base_url, ticker)?;
        debug!("GET {} range={}", url, range);

        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        let body: Result<ChartResponse, _> = response.json().await;

        // Yahoo reports unknown symbols as 404 with an error body
        match body {
            Ok(ChartResponse {
                chart:
                    ChartResult {
                        error: Some(error), ..
                    },
            }) => Err(MarketDataError::Api {
                code: error.code,
                description: error.description,
            }),
            Ok(_) if !status.is_success() => Err(MarketDataError::Status(status.as_u16())),
            Ok(ChartResponse { chart }) => chart
                .result
                .and_then(|r| r.into_iter().next())
                .ok_or_else(|| MarketDataError::NoData(ticker.to_string())),
            Err(_) if !status.is_success() => Err(MarketDataError::Status(status.as_u16())),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PriceFeed for YahooSession {
    async fn history(
        &self,
        ticker: &str,
        range: HistoryRange,
    ) -> Result<PriceHistory, MarketDataError> {
        let data = self.chart(ticker, range.as_query()).await?;
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let candles = candles_from_chart(ticker, data.timestamp.unwrap_or_default(), quote);
        Ok(PriceHistory {
            candles,
            name: data.meta.name(),
        })
    }

    async fn display_name(&self, ticker: &str) -> Result<Option<String>, MarketDataError> {
        Ok(self.chart(ticker, "1d").await?.meta.name())
    }
}

/// `{base}/v8/finance/chart/{ticker}` with the ticker percent-encoded as one segment
fn chart_url(base: &Url, ticker: &str) -> Result<Url, MarketDataError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| MarketDataError::Session(format!("base URL {} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart", ticker]);
    Ok(url)
}

/// Zip the column arrays into candles, dropping rows with any missing field
fn candles_from_chart(ticker: &str, timestamps: Vec<i64>, quote: Quote) -> Vec<Candle> {
    let field = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            Some(Candle::new(
                field(&quote.open, i)?,
                field(&quote.high, i)?,
                field(&quote.low, i)?,
                field(&quote.close, i)?,
                field(&quote.volume, i)?,
                timestamp,
                ticker.to_string(),
                "1d".to_string(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "2330.TW", "longName": "Taiwan Semiconductor Manufacturing Company Limited", "shortName": "TSMC"},
                "timestamp": [1700000000, 1700086400, 1700172800],
                "indicators": {"quote": [{
                    "open":   [100.0, null, 102.0],
                    "high":   [101.0, 103.0, 104.0],
                    "low":    [99.0, 100.0, 101.0],
                    "close":  [100.5, 102.5, 103.5],
                    "volume": [1000, 2000, 3000]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_drops_null_rows() {
        let response: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let data = response.chart.result.unwrap().into_iter().next().unwrap();
        let quote = data.indicators.quote.into_iter().next().unwrap();
        let candles = candles_from_chart("2330.TW", data.timestamp.unwrap(), quote);

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 100.5);
        assert_eq!(candles[1].close, 103.5);
        assert_eq!(candles[1].volume, 3000.0);
        assert_eq!(candles[1].symbol, "2330.TW");
    }

    #[test]
    fn test_meta_name_fallback() {
        let response: ChartResponse = serde_json::from_str(SAMPLE).unwrap();
        let meta = response.chart.result.unwrap().into_iter().next().unwrap().meta;
        assert_eq!(
            meta.name().as_deref(),
            Some("Taiwan Semiconductor Manufacturing Company Limited")
        );

        let meta = ChartMeta {
            long_name: Some("  ".to_string()),
            short_name: Some("TSMC".to_string()),
        };
        assert_eq!(meta.name().as_deref(), Some("TSMC"));

        let meta = ChartMeta {
            long_name: None,
            short_name: None,
        };
        assert_eq!(meta.name(), None);
    }

    #[test]
    fn test_error_body_parses() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let response: ChartResponse = serde_json::from_str(body).unwrap();
        let error = response.chart.error.unwrap();
        assert_eq!(error.code, "Not Found");
    }

    #[test]
    fn test_chart_url_encodes_ticker() {
        let base = Url::parse("https://query1.finance.yahoo.com").unwrap();
        assert_eq!(
            chart_url(&base, "2330.TW").unwrap().as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/2330.TW"
        );
        assert_eq!(
            chart_url(&base, "A/B?x#y").unwrap().as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/A%2FB%3Fx%23y"
        );

        let mirrored = Url::parse("http://127.0.0.1:8080/yahoo/").unwrap();
        assert_eq!(
            chart_url(&mirrored, "2454.TW").unwrap().as_str(),
            "http://127.0.0.1:8080/yahoo/v8/finance/chart/2454.TW"
        );
    }

    #[test]
    fn test_bad_base_url_fails_session() {
        let mut config = Config::with_data_dir("unused");
        config.market_data_base_url = "not a url".to_string();
        let err = YahooClient::new(&config).open_session().err().unwrap();
        assert!(matches!(err, MarketDataError::Session(_)));
    }

    #[test]
    fn test_bad_proxy_fails_session() {
        let mut config = Config::with_data_dir("unused");
        config.http_proxy_url = Some("not a url".to_string());
        let err = YahooClient::new(&config).open_session().err().unwrap();
        assert!(matches!(err, MarketDataError::Session(_)));
    }
}
