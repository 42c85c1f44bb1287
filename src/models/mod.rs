mod dashboard;
mod market;
pub mod numeric;
mod user;

pub use dashboard::{MarketSnapshot, SelectedStockView, WatchlistPrice, WatchlistPriceMap, WatchlistRow};
pub use market::{
    ActiveStock, EarningsEvent, FinancialItem, GainerRow, MarketMover, NewsRow, PricePoint, Profile,
    SectorPerformance, StockListing,
};
pub use user::{
    AuthResponse, ContactMessage, Credentials, GoogleLoginRequest, MessageResponse, NewWatchlistEntry,
    PingResponse, SignupRequest, User, UserResponse, UserUpdate, WatchlistEntry,
};
