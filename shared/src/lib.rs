pub mod config;
pub mod gene_cache;
pub mod labels;
pub mod market_data;
pub mod models;
pub mod report;
pub mod scanner;
pub mod templates;
pub mod watchlist;

pub use config::Config;
pub use gene_cache::GeneCache;
pub use market_data::{MarketDataError, PriceFeed, PriceSource, YahooClient};
pub use models::*;
pub use report::{build_table, csv_filename, export_csv, ReportTable};
pub use scanner::{ScanError, Scanner};
pub use templates::{IndexTemplate, ResultsTemplate, WatchlistSelectTemplate, WatchlistTemplate};
pub use watchlist::WatchlistStore;
