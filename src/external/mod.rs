pub mod http_client;
pub mod market_api;
#[cfg(test)]
pub(crate) mod mock;
pub mod token;
pub mod user_api;

pub use http_client::HttpApiClient;
pub use market_api::MarketDataApi;
pub use token::TokenHandle;
pub use user_api::UserApi;
