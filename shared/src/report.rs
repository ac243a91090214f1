//! Results table and CSV export built from a scan outcome

use crate::labels;
use crate::models::{ticker_code, AnalysisMode, ScanMode, ScanOutcome, ScanRow, Sector, TickerReport};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use hunter_core::analysis::{EntrySignal, TrendStatus};
use std::collections::HashMap;
use std::fmt::Display;

const UTF8_BOM: &str = "\u{feff}";

/// Missing fitness sorts below every real value
const MISSING_FITNESS_RANK: f64 = -9999.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub cells: Vec<String>,
    pub failed: bool,
}

/// Everything the results page shows
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<ReportRow>,
    pub report_info: String,
    pub error_flag: bool,
}

pub fn build_table(outcome: &ScanOutcome, mode: ScanMode) -> ReportTable {
    let error_flag = outcome.has_errors();

    let mut rows: Vec<&ScanRow> = outcome.rows.iter().collect();
    if mode == ScanMode::MarketBacktest && !error_flag {
        // stable, so equal fitness keeps list order
        rows.sort_by(|a, b| fitness_rank(b).total_cmp(&fitness_rank(a)));
    }

    let mut ambush_by_sector: HashMap<Sector, usize> = HashMap::new();
    for row in &rows {
        if let ScanRow::Success(report) = row {
            if report.signal == EntrySignal::Ambush && report.sector != Sector::Hot {
                *ambush_by_sector.entry(report.sector).or_default() += 1;
            }
        }
    }

    let rows = rows
        .into_iter()
        .map(|row| match row {
            ScanRow::Success(report) => {
                let group_rally = report.sector != Sector::Hot
                    && ambush_by_sector.get(&report.sector).copied().unwrap_or(0) >= 2;
                ReportRow {
                    cells: success_cells(report, order_for(report, group_rally)),
                    failed: false,
                }
            }
            ScanRow::Failed { message, .. } => ReportRow {
                cells: failed_cells(row, message.clone()),
                failed: true,
            },
        })
        .collect();

    let mut report_info = match outcome.analysis_mode {
        AnalysisMode::Weekly => labels::REPORT_WEEKLY_DONE.to_string(),
        AnalysisMode::Daily => String::new(),
    };
    if error_flag {
        report_info.insert_str(0, &labels::report_errors(outcome.error_count()));
    }

    ReportTable {
        headers: labels::TABLE_HEADERS.to_vec(),
        rows,
        report_info,
        error_flag,
    }
}

fn fitness_rank(row: &&ScanRow) -> f64 {
    row.fitness().unwrap_or(MISSING_FITNESS_RANK)
}

/// Action column for a successful row
fn order_for(report: &TickerReport, group_rally: bool) -> String {
    if report.status == TrendStatus::Weak {
        return labels::ORDER_AVOID.to_string();
    }
    match report.signal {
        EntrySignal::Ambush => {
            let prefix = if group_rally { labels::ORDER_GROUP_RALLY } else { "" };
            format!("{}{} {}", prefix, labels::ORDER_BUY, report.target_label())
        }
        EntrySignal::Watch => labels::ORDER_HOLD.to_string(),
    }
}

fn success_cells(report: &TickerReport, order: String) -> Vec<String> {
    vec![
        report.display_name(),
        report.window_label(),
        report.fitness_label(),
        report.price_label(),
        report.target_label(),
        labels::status_label(report.status).to_string(),
        labels::signal_label(report.signal).to_string(),
        order,
    ]
}

fn failed_cells(row: &ScanRow, message: String) -> Vec<String> {
    vec![
        row.name_label(),
        labels::NOT_AVAILABLE.to_string(),
        labels::NOT_AVAILABLE.to_string(),
        labels::NOT_AVAILABLE.to_string(),
        labels::NOT_AVAILABLE.to_string(),
        labels::STATUS_ERROR.to_string(),
        labels::SIGNAL_ERROR.to_string(),
        message,
    ]
}

/// CSV body with a UTF-8 BOM so spreadsheet apps pick the right encoding.
///
/// Any failed row switches the whole file to the two-column error layout.
pub fn export_csv(outcome: &ScanOutcome) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if outcome.has_errors() {
        writer.write_record(labels::CSV_ERROR_HEADERS)?;
        for row in &outcome.rows {
            let detail = match row {
                ScanRow::Failed { message, .. } => message.as_str(),
                ScanRow::Success(_) => labels::NOT_AVAILABLE,
            };
            writer.write_record([row.name_label().as_str(), detail])?;
        }
    } else {
        writer.write_record(labels::CSV_HEADERS)?;
        for row in &outcome.rows {
            if let ScanRow::Success(report) = row {
                writer.write_record([
                    ticker_code(&report.ticker).to_string(),
                    format!("{}{}", report.sector.label(), report.name),
                    report.window_label(),
                    report.fitness_label(),
                    report.price_label(),
                    report.target_label(),
                    labels::status_label(report.status).to_string(),
                    labels::signal_label(report.signal).to_string(),
                ])?;
            }
        }
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;
    let body = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    Ok(format!("{}{}", UTF8_BOM, body))
}

/// `weekly_scan_20240105_0930.csv`
pub fn csv_filename<Tz>(mode: ScanMode, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}_scan_{}.csv",
        mode.as_str().to_lowercase(),
        now.format("%Y%m%d_%H%M")
    )
}
