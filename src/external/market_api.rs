use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{
    ActiveStock, EarningsEvent, FinancialItem, GainerRow, MarketMover, NewsRow, PricePoint, Profile,
    SectorPerformance, StockListing,
};

/// Read-only market data served by the API's `/stocks` routes.
#[async_trait]
pub trait MarketDataApi: Send + Sync {
    async fn get_top_gainers(&self) -> Result<Vec<GainerRow>, AppError>;

    async fn get_top_losers(&self) -> Result<Vec<MarketMover>, AppError>;

    async fn get_most_active(&self) -> Result<Vec<ActiveStock>, AppError>;

    async fn get_sector_performance(&self) -> Result<Vec<SectorPerformance>, AppError>;

    /// Earnings reports scheduled in the next seven days.
    async fn get_upcoming_earnings(&self) -> Result<Vec<EarningsEvent>, AppError>;

    async fn get_market_news(&self) -> Result<Vec<NewsRow>, AppError>;

    /// Daily OHLCV rows for the last `days` days, oldest first.
    async fn get_stock_history(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>, AppError>;

    async fn get_stock_profile(&self, symbol: &str) -> Result<Profile, AppError>;

    async fn get_stock_financials(&self, symbol: &str) -> Result<Vec<FinancialItem>, AppError>;

    async fn get_stock_news(&self, symbol: &str) -> Result<Vec<NewsRow>, AppError>;

    async fn get_stocks_list(&self) -> Result<Vec<StockListing>, AppError>;
}
