//! Display strings for the Taiwan-market UI (Traditional Chinese)

use hunter_core::analysis::{EntrySignal, TrendStatus};

pub const STATUS_STRONG: &str = "✅強勢";
pub const STATUS_WEAK: &str = "❌弱勢";
pub const STATUS_ERROR: &str = "🔴 錯誤";

pub const SIGNAL_AMBUSH: &str = "🟢🟢 埋伏";
pub const SIGNAL_WATCH: &str = "⚪ 觀察";
pub const SIGNAL_ERROR: &str = "Data Error";

pub const ORDER_BUY: &str = "🎯【買入】看";
pub const ORDER_HOLD: &str = "🚀【持有】";
pub const ORDER_AVOID: &str = "🔴【避開】趨勢空";
pub const ORDER_GROUP_RALLY: &str = "🔥🔥【族群起漲!】";

pub const FAILED_NAME_PREFIX: &str = "分析失敗";
pub const NOT_AVAILABLE: &str = "N/A";

pub const WATCHLIST_PLACEHOLDER: &str = "# 請在此輸入您的自選股";

pub const REPORT_WEEKLY_DONE: &str = "每週分析完成，基因快取已更新。";

pub const TABLE_HEADERS: [&str; 8] = [
    "標的/族群",
    "基因",
    "5年戰績",
    "現價",
    "1.382預判",
    "狀態",
    "訊號",
    "👉 獵人作戰指令",
];

pub const CSV_HEADERS: [&str; 8] = [
    "標的",
    "名稱",
    "基因",
    "5年戰績",
    "現價",
    "1.382預判",
    "狀態",
    "訊號",
];

pub const CSV_ERROR_HEADERS: [&str; 2] = ["分析狀態", "詳細錯誤"];

pub fn report_errors(count: usize) -> String {
    format!("偵測到 {} 個分析錯誤。系統正在從錯誤中學習。 ", count)
}

pub fn status_label(status: TrendStatus) -> &'static str {
    match status {
        TrendStatus::Strong => STATUS_STRONG,
        TrendStatus::Weak => STATUS_WEAK,
    }
}

pub fn signal_label(signal: EntrySignal) -> &'static str {
    match signal {
        EntrySignal::Ambush => SIGNAL_AMBUSH,
        EntrySignal::Watch => SIGNAL_WATCH,
    }
}
