use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::market::{GainerRow, NewsRow, PricePoint, Profile};
use super::user::WatchlistEntry;

/// Cached dashboard data. `last_updated` is `None` until a fetch batch completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub top_gainers: Vec<GainerRow>,
    pub news: Vec<NewsRow>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Latest close and the same session's open for one watchlist symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchlistPrice {
    pub close: f64,
    pub prev: f64,
}

impl WatchlistPrice {
    /// Takes the most recent row of a history batch that has a close.
    /// A missing open falls back to the close.
    pub fn from_history(history: &[PricePoint]) -> Option<Self> {
        history.iter().rev().find_map(|point| {
            point.close.map(|close| Self {
                close,
                prev: point.open.unwrap_or(close),
            })
        })
    }
}

pub type WatchlistPriceMap = HashMap<String, WatchlistPrice>;

/// Detail view of one symbol. Never cached or persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedStockView {
    pub symbol: Option<String>,
    pub profile: Option<Profile>,
    pub history: Vec<PricePoint>,
    pub loading: bool,
    pub error: Option<String>,
}

/// A watchlist entry joined with its cached price, as the home page lists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistRow {
    pub symbol: String,
    pub add_price: f64,
    /// 0.0 while no price has been fetched for the symbol.
    pub current_price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl WatchlistRow {
    pub fn new(entry: &WatchlistEntry, price: Option<&WatchlistPrice>) -> Self {
        let add_price = entry.add_price.unwrap_or(0.0);
        let current_price = price.map(|p| p.close).unwrap_or(0.0);
        let change = current_price - add_price;
        let change_percent = if add_price != 0.0 {
            (change / add_price) * 100.0
        } else {
            0.0
        };
        Self {
            symbol: entry.symbol.clone(),
            add_price,
            current_price,
            change,
            change_percent,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.current_price > 0.0
    }
}
