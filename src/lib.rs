//! Client-side data layer for the Financst dashboard: a staleness-aware cache
//! of market data and watchlist prices, and the session that owns it.

pub mod app;
pub mod config;
pub mod errors;
pub mod external;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
