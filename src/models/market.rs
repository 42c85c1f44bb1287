use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::numeric::opt_f64_lenient;

// ==============================================================================
// Dashboard rows
// ==============================================================================

/// One row of the top gainers (or losers) list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainerRow {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub price: Option<f64>,
    #[serde(
        default,
        rename = "changePercent",
        alias = "change_percent",
        deserialize_with = "opt_f64_lenient"
    )]
    pub change_percent: Option<f64>,
}

/// Losers come back in the same shape as gainers.
pub type MarketMover = GainerRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStock {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPerformance {
    pub sector: String,
    #[serde(default, rename = "avgChange", alias = "avg_change", deserialize_with = "opt_f64_lenient")]
    pub avg_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(alias = "report_date")]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRow {
    pub title: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, alias = "report_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

// ==============================================================================
// Per-symbol data
// ==============================================================================

/// One OHLCV row of a symbol's price history, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(default, alias = "report_date")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub open: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub close: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub high: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub low: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub volume: Option<f64>,
}

/// Company profile. Columns the client does not model explicitly are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, alias = "marketCap", deserialize_with = "opt_f64_lenient")]
    pub market_cap: Option<f64>,
    #[serde(default, alias = "trailingPe", deserialize_with = "opt_f64_lenient")]
    pub trailing_pe: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub beta: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialItem {
    #[serde(alias = "report_date")]
    pub date: String,
    pub item_name: String,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub item_value: Option<f64>,
}

/// Entry of the searchable symbol list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockListing {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
}
