use std::sync::Arc;

use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::external::{HttpApiClient, MarketDataApi, TokenHandle, UserApi};
use crate::store::{AuthStore, Clock, FileStorage, StateStorage, StockStore, SystemClock};

/// Everything a screen or background job needs, shared behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub user_api: Arc<dyn UserApi>,
    pub market_api: Arc<dyn MarketDataApi>,
    pub stocks: Arc<StockStore>,
    pub auth: Arc<AuthStore>,
}

impl AppState {
    /// Wires the HTTP client and file-backed stores from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        let token = TokenHandle::new();
        let client = Arc::new(HttpApiClient::new(&config.api_url, token.clone(), config.http_timeout)?);
        let storage = Arc::new(FileStorage::new(&config.storage_dir)?);

        Ok(Self::from_parts(client.clone(), client, storage, Arc::new(SystemClock), token))
    }

    pub fn from_parts(
        user_api: Arc<dyn UserApi>,
        market_api: Arc<dyn MarketDataApi>,
        storage: Arc<dyn StateStorage>,
        clock: Arc<dyn Clock>,
        token: TokenHandle,
    ) -> Self {
        let stocks = Arc::new(StockStore::new(market_api.clone(), storage.clone(), clock.clone()));
        let auth = Arc::new(AuthStore::new(token, stocks.clone(), storage, clock));

        Self {
            user_api,
            market_api,
            stocks,
            auth,
        }
    }
}
