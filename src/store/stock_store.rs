use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::external::MarketDataApi;
use crate::models::{
    MarketSnapshot, SelectedStockView, WatchlistEntry, WatchlistPrice, WatchlistPriceMap, WatchlistRow,
};
use crate::store::clock::Clock;
use crate::store::persistence::{load_json, save_json, StateStorage};

/// Durable slot holding the dashboard snapshot and watchlist prices.
pub const STOCK_STORAGE_KEY: &str = "stock-storage";

/// Dashboard data younger than this is served from cache.
pub const DASHBOARD_FRESH_SECS: i64 = 5 * 60;
/// Watchlist prices younger than this are served from cache if every symbol is present.
pub const WATCHLIST_CACHE_SECS: i64 = 2 * 60;

pub const WATCHLIST_HISTORY_DAYS: u32 = 1;
pub const DETAIL_HISTORY_DAYS: u32 = 365;

/// Shown on the detail view when neither detail request reached the server.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network Error";

#[derive(Debug, Default)]
struct StockState {
    market_data: MarketSnapshot,
    watchlist_prices: WatchlistPriceMap,
    last_watchlist_updated: Option<DateTime<Utc>>,
    current_stock: SelectedStockView,
}

/// The part of [`StockState`] that survives a restart.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStockState {
    #[serde(default)]
    pub market_data: MarketSnapshot,
    #[serde(default)]
    pub watchlist_prices: WatchlistPriceMap,
}

/// Persistence allow-list: only these fields are ever written to storage.
fn persisted_slice(state: &StockState) -> PersistedStockState {
    PersistedStockState {
        market_data: state.market_data.clone(),
        watchlist_prices: state.watchlist_prices.clone(),
    }
}

/// Identifies one fetch batch so a late response can be recognised and dropped.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    generation: u64,
}

/// Client-side cache of dashboard data, watchlist prices and the symbol detail view.
///
/// Fetch operations never return errors: failed requests degrade to empty or
/// unchanged data and are logged. Overlapping calls to the same operation are
/// resolved in favour of the most recently started one; `reset_store` also
/// invalidates every batch still in flight.
pub struct StockStore {
    api: Arc<dyn MarketDataApi>,
    storage: Arc<dyn StateStorage>,
    clock: Arc<dyn Clock>,
    state: RwLock<StockState>,
    epoch: AtomicU64,
    dashboard_generation: AtomicU64,
    watchlist_generation: AtomicU64,
    detail_generation: AtomicU64,
}

impl StockStore {
    /// Builds the store and rehydrates whatever was persisted last time.
    pub fn new(api: Arc<dyn MarketDataApi>, storage: Arc<dyn StateStorage>, clock: Arc<dyn Clock>) -> Self {
        let persisted: PersistedStockState =
            load_json(storage.as_ref(), STOCK_STORAGE_KEY).unwrap_or_default();
        if persisted.market_data.last_updated.is_some() || !persisted.watchlist_prices.is_empty() {
            info!(
                "📦 Rehydrated stock cache ({} gainers, {} news, {} watchlist prices)",
                persisted.market_data.top_gainers.len(),
                persisted.market_data.news.len(),
                persisted.watchlist_prices.len()
            );
        }

        let state = StockState {
            market_data: persisted.market_data,
            watchlist_prices: persisted.watchlist_prices,
            ..Default::default()
        };

        Self {
            api,
            storage,
            clock,
            state: RwLock::new(state),
            epoch: AtomicU64::new(0),
            dashboard_generation: AtomicU64::new(0),
            watchlist_generation: AtomicU64::new(0),
            detail_generation: AtomicU64::new(0),
        }
    }

    // ==========================================================================
    // Read projections
    // ==========================================================================

    pub fn market_data(&self) -> MarketSnapshot {
        self.state.read().market_data.clone()
    }

    pub fn watchlist_prices(&self) -> WatchlistPriceMap {
        self.state.read().watchlist_prices.clone()
    }

    pub fn watchlist_price(&self, symbol: &str) -> Option<WatchlistPrice> {
        self.state.read().watchlist_prices.get(symbol).copied()
    }

    pub fn last_watchlist_updated(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_watchlist_updated
    }

    pub fn current_stock(&self) -> SelectedStockView {
        self.state.read().current_stock.clone()
    }

    /// Joins watchlist entries with their cached prices.
    pub fn watchlist_rows(&self, entries: &[WatchlistEntry]) -> Vec<WatchlistRow> {
        let state = self.state.read();
        entries
            .iter()
            .map(|entry| WatchlistRow::new(entry, state.watchlist_prices.get(&entry.symbol)))
            .collect()
    }

    // ==========================================================================
    // Dashboard
    // ==========================================================================

    fn dashboard_is_fresh(&self, now: DateTime<Utc>) -> bool {
        let state = self.state.read();
        let snapshot = &state.market_data;
        match snapshot.last_updated {
            Some(last) => {
                now - last < Duration::seconds(DASHBOARD_FRESH_SECS) && !snapshot.top_gainers.is_empty()
            }
            None => false,
        }
    }

    /// Refreshes top gainers and market news unless the cached snapshot is fresh.
    pub async fn fetch_dashboard_data(&self, force_update: bool) {
        let now = self.clock.now();
        if !force_update && self.dashboard_is_fresh(now) {
            debug!("Dashboard cache hit");
            return;
        }

        let ticket = self.issue_ticket(&self.dashboard_generation);
        let (gainers, news) = tokio::join!(self.api.get_top_gainers(), self.api.get_market_news());

        let top_gainers = gainers.unwrap_or_else(|e| {
            warn!("Top gainers fetch failed, showing none: {}", e);
            Vec::new()
        });
        let news = news.unwrap_or_else(|e| {
            warn!("Market news fetch failed, showing none: {}", e);
            Vec::new()
        });

        {
            let mut state = self.state.write();
            if !self.is_current(ticket, &self.dashboard_generation) {
                debug!("Discarding superseded dashboard batch");
                return;
            }
            info!(
                "📈 Dashboard updated ({} gainers, {} news)",
                top_gainers.len(),
                news.len()
            );
            state.market_data = MarketSnapshot {
                top_gainers,
                news,
                last_updated: Some(now),
            };
        }
        self.persist();
    }

    // ==========================================================================
    // Watchlist prices
    // ==========================================================================

    fn watchlist_is_fresh(&self, items: &[WatchlistEntry], now: DateTime<Utc>) -> bool {
        let state = self.state.read();
        match state.last_watchlist_updated {
            Some(last) if now - last < Duration::seconds(WATCHLIST_CACHE_SECS) => items
                .iter()
                .all(|item| state.watchlist_prices.contains_key(&item.symbol)),
            _ => false,
        }
    }

    /// Fetches the latest daily bar for every watchlist symbol and merges the results.
    ///
    /// A symbol whose request fails or returns no rows keeps its previous price.
    pub async fn fetch_watchlist_prices(&self, items: &[WatchlistEntry]) {
        if items.is_empty() {
            return;
        }

        let now = self.clock.now();
        if self.watchlist_is_fresh(items, now) {
            debug!("Watchlist price cache hit ({} symbols)", items.len());
            return;
        }

        let mut seen = HashSet::new();
        let symbols: Vec<&str> = items
            .iter()
            .map(|item| item.symbol.as_str())
            .filter(|symbol| seen.insert(*symbol))
            .collect();

        let ticket = self.issue_ticket(&self.watchlist_generation);
        let api = self.api.as_ref();
        let fetches = symbols.iter().map(|symbol| async move {
            match api.get_stock_history(symbol, WATCHLIST_HISTORY_DAYS).await {
                Ok(history) => match WatchlistPrice::from_history(&history) {
                    Some(price) => Some((symbol.to_string(), price)),
                    None => {
                        debug!("No recent bars for {}, keeping cached price", symbol);
                        None
                    }
                },
                Err(e) => {
                    warn!("Price fetch failed for {}, keeping cached price: {}", symbol, e);
                    None
                }
            }
        });
        let results: Vec<(String, WatchlistPrice)> = join_all(fetches).await.into_iter().flatten().collect();

        {
            let mut state = self.state.write();
            if !self.is_current(ticket, &self.watchlist_generation) {
                debug!("Discarding superseded watchlist batch");
                return;
            }
            info!("💹 Watchlist prices updated ({}/{} symbols)", results.len(), symbols.len());
            state.watchlist_prices.extend(results);
            state.last_watchlist_updated = Some(now);
        }
        self.persist();
    }

    /// Drops a symbol's cached price after it leaves the watchlist.
    pub fn forget_watchlist_price(&self, symbol: &str) {
        if self.state.write().watchlist_prices.remove(symbol).is_none() {
            return;
        }
        debug!("Dropped cached price for {}", symbol);
        self.persist();
    }

    // ==========================================================================
    // Symbol detail view
    // ==========================================================================

    /// Loads profile and one year of history for the detail view.
    pub async fn fetch_stock_details(&self, symbol: &str) {
        let ticket = self.issue_ticket(&self.detail_generation);
        {
            let mut state = self.state.write();
            let view = &mut state.current_stock;
            if view.symbol.as_deref() != Some(symbol) {
                view.profile = None;
                view.history.clear();
            }
            view.symbol = Some(symbol.to_string());
            view.loading = true;
            view.error = None;
        }

        let (profile, history) = tokio::join!(
            self.api.get_stock_profile(symbol),
            self.api.get_stock_history(symbol, DETAIL_HISTORY_DAYS)
        );

        let mut state = self.state.write();
        if !self.is_current(ticket, &self.detail_generation) {
            debug!("Discarding stale details for {}", symbol);
            return;
        }

        if let (Err(AppError::Network(p)), Err(AppError::Network(h))) = (&profile, &history) {
            error!("Stock details for {} unreachable: {} / {}", symbol, p, h);
            let view = &mut state.current_stock;
            view.loading = false;
            view.error = Some(NETWORK_FAILURE_MESSAGE.to_string());
            return;
        }

        let error = profile
            .as_ref()
            .err()
            .or(history.as_ref().err())
            .map(AppError::user_message);
        if let Some(msg) = &error {
            warn!("Stock details for {} incomplete: {}", symbol, msg);
        }

        state.current_stock = SelectedStockView {
            symbol: Some(symbol.to_string()),
            profile: profile.ok(),
            history: history.unwrap_or_default(),
            loading: false,
            error,
        };
    }

    /// Releases the detail view when the user navigates away.
    pub fn clear_current_stock(&self) {
        let mut state = self.state.write();
        self.detail_generation.fetch_add(1, Ordering::SeqCst);
        state.current_stock = SelectedStockView::default();
    }

    // ==========================================================================
    // Reset
    // ==========================================================================

    /// Wipes every cached value, in memory and on disk.
    pub fn reset_store(&self) {
        info!("🧹 Stock store is being reset (cache cleared)");
        {
            let mut state = self.state.write();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            *state = StockState::default();
        }
        self.persist();
    }

    // ==========================================================================
    // Internals
    // ==========================================================================

    fn issue_ticket(&self, generation: &AtomicU64) -> Ticket {
        Ticket {
            epoch: self.epoch.load(Ordering::SeqCst),
            generation: generation.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Must be called with the state write lock held.
    fn is_current(&self, ticket: Ticket, generation: &AtomicU64) -> bool {
        ticket.epoch == self.epoch.load(Ordering::SeqCst) && ticket.generation == generation.load(Ordering::SeqCst)
    }

    fn persist(&self) {
        let slice = persisted_slice(&self.state.read());
        save_json(self.storage.as_ref(), STOCK_STORAGE_KEY, &slice);
    }
}
