//! In-memory API doubles for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::errors::AppError;
use crate::external::market_api::MarketDataApi;
use crate::external::user_api::UserApi;
use crate::models::*;

#[derive(Debug, Clone)]
pub(crate) enum MockError {
    Api(String),
    Network,
    Unauthorized,
}

impl MockError {
    fn to_app(&self) -> AppError {
        match self {
            MockError::Api(msg) => AppError::Api(msg.clone()),
            MockError::Network => AppError::Network("connection refused".to_string()),
            MockError::Unauthorized => AppError::Unauthorized,
        }
    }
}

fn reply<T: Clone>(r: &Result<T, MockError>) -> Result<T, AppError> {
    r.clone().map_err(|e| e.to_app())
}

pub(crate) fn gainer(symbol: &str, price: f64, change_percent: f64) -> GainerRow {
    GainerRow {
        symbol: symbol.to_string(),
        name: Some(format!("{} Inc.", symbol)),
        price: Some(price),
        change_percent: Some(change_percent),
    }
}

pub(crate) fn news(title: &str) -> NewsRow {
    NewsRow {
        title: title.to_string(),
        publisher: Some("Reuters".to_string()),
        date: Some("2024-05-01 10:00:00".to_string()),
        link: Some("https://example.com/n".to_string()),
        kind: None,
    }
}

pub(crate) fn bar(open: f64, close: f64) -> PricePoint {
    PricePoint {
        date: Some("2024-05-01".to_string()),
        open: Some(open),
        close: Some(close),
        high: None,
        low: None,
        volume: None,
    }
}

pub(crate) fn profile(symbol: &str) -> Profile {
    Profile {
        symbol: symbol.to_string(),
        name: Some(format!("{} Corp", symbol)),
        sector: Some("Technology".to_string()),
        industry: None,
        market_cap: Some(1.0e12),
        trailing_pe: Some(30.0),
        beta: Some(1.1),
        extra: Default::default(),
    }
}

pub(crate) struct MockMarketApi {
    pub gainers: Mutex<Result<Vec<GainerRow>, MockError>>,
    pub news: Mutex<Result<Vec<NewsRow>, MockError>>,
    pub losers: Mutex<Result<Vec<MarketMover>, MockError>>,
    pub listing: Mutex<Vec<StockListing>>,
    pub history: DashMap<String, Result<Vec<PricePoint>, MockError>>,
    pub profiles: DashMap<String, Result<Profile, MockError>>,
    /// Per-symbol latency for history and profile requests.
    pub delays: DashMap<String, Duration>,
    pub gainers_calls: AtomicUsize,
    pub news_calls: AtomicUsize,
    pub history_calls: DashMap<String, usize>,
    pub profile_calls: AtomicUsize,
}

impl MockMarketApi {
    pub fn new() -> Self {
        Self {
            gainers: Mutex::new(Ok(vec![])),
            news: Mutex::new(Ok(vec![])),
            losers: Mutex::new(Ok(vec![])),
            listing: Mutex::new(vec![]),
            history: DashMap::new(),
            profiles: DashMap::new(),
            delays: DashMap::new(),
            gainers_calls: AtomicUsize::new(0),
            news_calls: AtomicUsize::new(0),
            history_calls: DashMap::new(),
            profile_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_gainers(&self, r: Result<Vec<GainerRow>, MockError>) {
        *self.gainers.lock() = r;
    }

    pub fn set_news(&self, r: Result<Vec<NewsRow>, MockError>) {
        *self.news.lock() = r;
    }

    pub fn set_history(&self, symbol: &str, r: Result<Vec<PricePoint>, MockError>) {
        self.history.insert(symbol.to_string(), r);
    }

    pub fn set_profile(&self, symbol: &str, r: Result<Profile, MockError>) {
        self.profiles.insert(symbol.to_string(), r);
    }

    pub fn dashboard_calls(&self) -> (usize, usize) {
        (
            self.gainers_calls.load(Ordering::SeqCst),
            self.news_calls.load(Ordering::SeqCst),
        )
    }

    pub fn history_calls_for(&self, symbol: &str) -> usize {
        self.history_calls.get(symbol).map(|c| *c).unwrap_or(0)
    }

    pub fn total_history_calls(&self) -> usize {
        self.history_calls.iter().map(|e| *e.value()).sum()
    }

    async fn delay_for(&self, symbol: &str) {
        let delay = self.delays.get(symbol).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl MarketDataApi for MockMarketApi {
    async fn get_top_gainers(&self) -> Result<Vec<GainerRow>, AppError> {
        self.gainers_calls.fetch_add(1, Ordering::SeqCst);
        reply(&*self.gainers.lock())
    }

    async fn get_top_losers(&self) -> Result<Vec<MarketMover>, AppError> {
        reply(&*self.losers.lock())
    }

    async fn get_most_active(&self) -> Result<Vec<ActiveStock>, AppError> {
        Ok(vec![])
    }

    async fn get_sector_performance(&self) -> Result<Vec<SectorPerformance>, AppError> {
        Ok(vec![])
    }

    async fn get_upcoming_earnings(&self) -> Result<Vec<EarningsEvent>, AppError> {
        Ok(vec![])
    }

    async fn get_market_news(&self) -> Result<Vec<NewsRow>, AppError> {
        self.news_calls.fetch_add(1, Ordering::SeqCst);
        reply(&*self.news.lock())
    }

    async fn get_stock_history(&self, symbol: &str, _days: u32) -> Result<Vec<PricePoint>, AppError> {
        *self.history_calls.entry(symbol.to_string()).or_insert(0) += 1;
        self.delay_for(symbol).await;
        match self.history.get(symbol) {
            Some(r) => reply(r.value()),
            None => Ok(vec![]),
        }
    }

    async fn get_stock_profile(&self, symbol: &str) -> Result<Profile, AppError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.delay_for(symbol).await;
        match self.profiles.get(symbol) {
            Some(r) => reply(r.value()),
            None => Err(AppError::Api("Profile not found".to_string())),
        }
    }

    async fn get_stock_financials(&self, _symbol: &str) -> Result<Vec<FinancialItem>, AppError> {
        Ok(vec![])
    }

    async fn get_stock_news(&self, _symbol: &str) -> Result<Vec<NewsRow>, AppError> {
        Ok(vec![])
    }

    async fn get_stocks_list(&self) -> Result<Vec<StockListing>, AppError> {
        Ok(self.listing.lock().clone())
    }
}

pub(crate) fn user_with(symbols: &[&str]) -> User {
    User {
        id: "user-1".to_string(),
        name: "Ada".to_string(),
        surname: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        profile_picture: None,
        bio: None,
        auth_provider: Some("local".to_string()),
        watch_list: symbols.iter().map(|s| WatchlistEntry::stock(*s)).collect(),
    }
}

/// Account API double. Watchlist edits are applied to an in-memory user record.
pub(crate) struct MockUserApi {
    pub user: Mutex<User>,
    pub token: String,
    pub login_result: Mutex<Option<MockError>>,
    pub fail_with: Mutex<Option<MockError>>,
    pub add_calls: AtomicUsize,
}

impl MockUserApi {
    pub fn new(user: User, token: &str) -> Self {
        Self {
            user: Mutex::new(user),
            token: token.to_string(),
            login_result: Mutex::new(None),
            fail_with: Mutex::new(None),
            add_calls: AtomicUsize::new(0),
        }
    }

    fn check(&self) -> Result<(), AppError> {
        match self.fail_with.lock().as_ref() {
            Some(e) => Err(e.to_app()),
            None => Ok(()),
        }
    }

    fn auth_response(&self) -> Result<AuthResponse, AppError> {
        if let Some(e) = self.login_result.lock().as_ref() {
            return Err(e.to_app());
        }
        Ok(AuthResponse {
            user: self.user.lock().clone(),
            token: self.token.clone(),
        })
    }

    fn user_response(&self, message: &str) -> UserResponse {
        UserResponse {
            message: Some(message.to_string()),
            user: self.user.lock().clone(),
        }
    }
}

#[async_trait]
impl UserApi for MockUserApi {
    async fn login(&self, _credentials: &Credentials) -> Result<AuthResponse, AppError> {
        self.auth_response()
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<AuthResponse, AppError> {
        self.auth_response()
    }

    async fn google_login(&self, _request: &GoogleLoginRequest) -> Result<AuthResponse, AppError> {
        self.auth_response()
    }

    async fn get_user(&self, _user_id: &str) -> Result<User, AppError> {
        self.check()?;
        Ok(self.user.lock().clone())
    }

    async fn update_user(&self, _user_id: &str, update: &UserUpdate) -> Result<UserResponse, AppError> {
        self.check()?;
        {
            let mut user = self.user.lock();
            if let Some(name) = &update.name {
                user.name = name.clone();
            }
            if let Some(bio) = &update.bio {
                user.bio = Some(bio.clone());
            }
        }
        Ok(self.user_response("User updated successfully"))
    }

    async fn delete_user(&self, _user_id: &str) -> Result<MessageResponse, AppError> {
        self.check()?;
        Ok(MessageResponse {
            message: "User account deleted successfully".to_string(),
        })
    }

    async fn add_watchlist_entry(
        &self,
        _user_id: &str,
        entry: &NewWatchlistEntry,
    ) -> Result<UserResponse, AppError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        {
            let mut user = self.user.lock();
            if user.has_symbol(&entry.symbol) {
                return Err(AppError::Api("Symbol already in watchlist".to_string()));
            }
            let mut added = WatchlistEntry::stock(entry.symbol.clone());
            added.add_price = Some(entry.add_price);
            user.watch_list.push(added);
        }
        Ok(self.user_response("Symbol added to watchlist"))
    }

    async fn delete_watchlist_entry(&self, _user_id: &str, symbol: &str) -> Result<UserResponse, AppError> {
        self.check()?;
        self.user.lock().watch_list.retain(|e| e.symbol != symbol);
        Ok(self.user_response("Symbol removed from watchlist"))
    }

    async fn forgot_password(&self, _email: &str) -> Result<MessageResponse, AppError> {
        self.check()?;
        Ok(MessageResponse {
            message: "Email sent successfully".to_string(),
        })
    }

    async fn reset_password(&self, _reset_token: &str, _password: &str) -> Result<MessageResponse, AppError> {
        self.check()?;
        Ok(MessageResponse {
            message: "Password updated successfully".to_string(),
        })
    }

    async fn send_contact_message(&self, _message: &ContactMessage) -> Result<MessageResponse, AppError> {
        self.check()?;
        Ok(MessageResponse {
            message: "Message sent".to_string(),
        })
    }

    async fn ping(&self) -> Result<PingResponse, AppError> {
        self.check()?;
        Ok(PingResponse {
            message: "Pong!".to_string(),
            db_status: Some("Connected".to_string()),
            server_time: chrono::Utc::now(),
        })
    }
}
