use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::models::{ActiveStock, EarningsEvent, FinancialItem, MarketMover, NewsRow, SectorPerformance, StockListing};
use crate::state::AppState;

/// Most symbol-search results shown at once.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// The markets page: everything beyond the home page's gainers and news.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub top_losers: Vec<MarketMover>,
    pub most_active: Vec<ActiveStock>,
    pub sectors: Vec<SectorPerformance>,
    pub upcoming_earnings: Vec<EarningsEvent>,
}

/// Detail-page panels loaded alongside the profile and chart.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockExtras {
    pub financials: Vec<FinancialItem>,
    pub news: Vec<NewsRow>,
}

fn or_empty<T>(what: &str, result: Result<Vec<T>, AppError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!("{} fetch failed, showing none: {}", what, e);
        Vec::new()
    })
}

pub async fn market_overview(state: &AppState) -> MarketOverview {
    let api = &state.market_api;
    let (losers, active, sectors, earnings) = tokio::join!(
        api.get_top_losers(),
        api.get_most_active(),
        api.get_sector_performance(),
        api.get_upcoming_earnings()
    );

    MarketOverview {
        top_losers: or_empty("Top losers", losers),
        most_active: or_empty("Most active", active),
        sectors: or_empty("Sector performance", sectors),
        upcoming_earnings: or_empty("Upcoming earnings", earnings),
    }
}

pub async fn stock_extras(state: &AppState, symbol: &str) -> StockExtras {
    let (financials, news) = tokio::join!(
        state.market_api.get_stock_financials(symbol),
        state.market_api.get_stock_news(symbol)
    );

    StockExtras {
        financials: or_empty("Financials", financials),
        news: or_empty("Stock news", news),
    }
}

/// The full symbol directory used by search. Empty when the API is unreachable.
pub async fn stock_list(state: &AppState) -> Vec<StockListing> {
    or_empty("Stock list", state.market_api.get_stocks_list().await)
}

/// Case-insensitive substring search over symbol and name.
///
/// Ranking: exact symbol, then symbol prefix, then name prefix; ties keep
/// directory order. Listings without a name are never matched.
pub fn search_stocks(listing: &[StockListing], query: &str) -> Vec<StockListing> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(&StockListing, String, String)> = listing
        .iter()
        .filter_map(|stock| {
            let name = stock.name.as_deref()?.to_lowercase();
            let symbol = stock.symbol.to_lowercase();
            (symbol.contains(&query) || name.contains(&query)).then_some((stock, symbol, name))
        })
        .collect();

    let rank = |symbol: &str, name: &str| -> u8 {
        if symbol == query {
            0
        } else if symbol.starts_with(&query) {
            1
        } else if name.starts_with(&query) {
            2
        } else {
            3
        }
    };
    matches.sort_by(|(_, a_sym, a_name), (_, b_sym, b_name)| {
        rank(a_sym, a_name).cmp(&rank(b_sym, b_name))
    });

    matches
        .into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|(stock, _, _)| stock.clone())
        .collect()
}
