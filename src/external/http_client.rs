use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::errors::AppError;
use crate::external::market_api::MarketDataApi;
use crate::external::token::TokenHandle;
use crate::external::user_api::UserApi;
use crate::models::{
    ActiveStock, AuthResponse, ContactMessage, Credentials, EarningsEvent, FinancialItem, GainerRow,
    GoogleLoginRequest, MarketMover, MessageResponse, NewWatchlistEntry, NewsRow, PingResponse, PricePoint,
    Profile, SectorPerformance, SignupRequest, StockListing, User, UserResponse, UserUpdate,
};

/// reqwest client for the dashboard REST API.
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    token: TokenHandle,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpApiClient {
    pub fn new(base_url: &str, token: TokenHandle, timeout: Option<Duration>) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Validation(format!("invalid API base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!("API base URL {} cannot be a base", base_url)));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self { client, base_url, token })
    }

    /// Builds `{base}/seg1/seg2/...`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn request<B, T>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url.path());

        let mut req = self.client.request(method.clone(), url.clone());
        if let Some(bearer) = self.token.bearer() {
            req = req.header(reqwest::header::AUTHORIZATION, bearer);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url.path(), e);
            AppError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<T>()
                .await
                .map_err(|e| AppError::Parse(format!("{}: {}", url.path(), e)));
        }

        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error);
        warn!("{} {} returned {}: {:?}", method, url.path(), status, message);
        Err(classify_error(segments, status, message))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AppError> {
        self.request::<(), T>(Method::GET, segments, None).await
    }
}

/// A 401 from the auth routes is a rejected login, not an expired session.
fn classify_error(segments: &[&str], status: StatusCode, message: Option<String>) -> AppError {
    if status == StatusCode::UNAUTHORIZED && segments.first() == Some(&"auth") {
        return AppError::Api(message.unwrap_or_else(|| "Unauthorized".to_string()));
    }
    AppError::from_status(status, message)
}

#[async_trait]
impl MarketDataApi for HttpApiClient {
    async fn get_top_gainers(&self) -> Result<Vec<GainerRow>, AppError> {
        self.get(&["stocks", "dashboard", "gainers"]).await
    }

    async fn get_top_losers(&self) -> Result<Vec<MarketMover>, AppError> {
        self.get(&["stocks", "dashboard", "losers"]).await
    }

    async fn get_most_active(&self) -> Result<Vec<ActiveStock>, AppError> {
        self.get(&["stocks", "dashboard", "active"]).await
    }

    async fn get_sector_performance(&self) -> Result<Vec<SectorPerformance>, AppError> {
        self.get(&["stocks", "dashboard", "sectors"]).await
    }

    async fn get_upcoming_earnings(&self) -> Result<Vec<EarningsEvent>, AppError> {
        self.get(&["stocks", "dashboard", "earnings"]).await
    }

    async fn get_market_news(&self) -> Result<Vec<NewsRow>, AppError> {
        self.get(&["stocks", "news", "market"]).await
    }

    async fn get_stock_history(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>, AppError> {
        let days = days.to_string();
        self.get(&["stocks", symbol, "history", days.as_str()]).await
    }

    async fn get_stock_profile(&self, symbol: &str) -> Result<Profile, AppError> {
        self.get(&["stocks", symbol, "profile"]).await
    }

    async fn get_stock_financials(&self, symbol: &str) -> Result<Vec<FinancialItem>, AppError> {
        self.get(&["stocks", symbol, "financials"]).await
    }

    async fn get_stock_news(&self, symbol: &str) -> Result<Vec<NewsRow>, AppError> {
        self.get(&["stocks", symbol, "news"]).await
    }

    async fn get_stocks_list(&self) -> Result<Vec<StockListing>, AppError> {
        self.get(&["stocks", "list"]).await
    }
}

#[async_trait]
impl UserApi for HttpApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AppError> {
        self.request(Method::POST, &["auth", "login"], Some(credentials)).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, AppError> {
        self.request(Method::POST, &["auth", "signup"], Some(request)).await
    }

    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<AuthResponse, AppError> {
        self.request(Method::POST, &["auth", "google-login"], Some(request)).await
    }

    async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        self.get(&["user", user_id]).await
    }

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<UserResponse, AppError> {
        self.request(Method::PUT, &["user", user_id], Some(update)).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<MessageResponse, AppError> {
        self.request::<(), _>(Method::DELETE, &["user", user_id], None).await
    }

    async fn add_watchlist_entry(
        &self,
        user_id: &str,
        entry: &NewWatchlistEntry,
    ) -> Result<UserResponse, AppError> {
        self.request(Method::POST, &["user", user_id, "watchlist"], Some(entry)).await
    }

    async fn delete_watchlist_entry(&self, user_id: &str, symbol: &str) -> Result<UserResponse, AppError> {
        let body = serde_json::json!({ "symbol": symbol });
        self.request(Method::DELETE, &["user", user_id, "watchlist"], Some(&body)).await
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, AppError> {
        let body = serde_json::json!({ "email": email });
        self.request(Method::POST, &["auth", "forgot-password"], Some(&body)).await
    }

    async fn reset_password(&self, reset_token: &str, password: &str) -> Result<MessageResponse, AppError> {
        let body = serde_json::json!({ "password": password });
        self.request(Method::POST, &["auth", "reset-password", reset_token], Some(&body))
            .await
    }

    async fn send_contact_message(&self, message: &ContactMessage) -> Result<MessageResponse, AppError> {
        self.request(Method::POST, &["contact"], Some(message)).await
    }

    async fn ping(&self) -> Result<PingResponse, AppError> {
        self.get(&["ping"]).await
    }
}
