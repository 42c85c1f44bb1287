use serde::Serialize;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::models::{MarketSnapshot, WatchlistRow};
use crate::services::job_scheduler_service::JobSchedulerService;
use crate::state::AppState;
use crate::store::SessionStatus;

/// What the home page renders: the dashboard snapshot plus the priced watchlist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub market: MarketSnapshot,
    pub watchlist: Vec<WatchlistRow>,
}

/// Mount behaviour of the home page: cached reads unless stale.
pub async fn load_home(state: &AppState) -> HomeView {
    state.stocks.fetch_dashboard_data(false).await;

    let entries = state.auth.user().map(|u| u.watch_list).unwrap_or_default();
    state.stocks.fetch_watchlist_prices(&entries).await;

    HomeView {
        market: state.stocks.market_data(),
        watchlist: state.stocks.watchlist_rows(&entries),
    }
}

/// Validates the restored session, starts background jobs and warms the home page.
pub async fn start(state: &AppState, config: &ClientConfig) -> Result<JobSchedulerService, AppError> {
    match state.auth.check_session() {
        SessionStatus::Valid => {
            if let Some(user) = state.auth.user() {
                info!("Session valid for {}", user.email);
            }
        }
        SessionStatus::Anonymous => info!("No stored session, browsing signed out"),
        SessionStatus::Expired | SessionStatus::Invalid => warn!("Stored session discarded"),
    }

    let mut scheduler = JobSchedulerService::new(state.auth.clone(), &config.session_check_cron).await?;
    scheduler.start().await?;

    let home = load_home(state).await;
    info!(
        "🏠 Home ready: {} gainers, {} news, {} watchlist rows ({} priced)",
        home.market.top_gainers.len(),
        home.market.news.len(),
        home.watchlist.len(),
        home.watchlist.iter().filter(|row| row.is_priced()).count()
    );

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mock::{bar, gainer, user_with, MockMarketApi, MockUserApi};
    use crate::external::TokenHandle;
    use crate::store::{ManualClock, MemoryStorage};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load_home_joins_watchlist_prices() {
        let market = Arc::new(MockMarketApi::new());
        market.set_gainers(Ok(vec![gainer("AAPL", 150.0, 2.1)]));
        market.set_history("MSFT", Ok(vec![bar(298.0, 300.5)]));
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap());
        let state = AppState::from_parts(
            Arc::new(MockUserApi::new(user_with(&[]), "tok")),
            market.clone(),
            Arc::new(MemoryStorage::new()),
            Arc::new(clock),
            TokenHandle::new(),
        );
        state.auth.set_login(user_with(&["MSFT", "TSLA"]), "tok".into());

        let home = load_home(&state).await;

        assert_eq!(home.market.top_gainers.len(), 1);
        assert_eq!(home.watchlist.len(), 2);
        assert_eq!(home.watchlist[0].current_price, 300.5);
        assert!(!home.watchlist[1].is_priced());

        load_home(&state).await;
        assert_eq!(market.dashboard_calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_load_home_signed_out_skips_watchlist() {
        let market = Arc::new(MockMarketApi::new());
        let state = AppState::from_parts(
            Arc::new(MockUserApi::new(user_with(&[]), "tok")),
            market.clone(),
            Arc::new(MemoryStorage::new()),
            Arc::new(ManualClock::new(Utc::now())),
            TokenHandle::new(),
        );

        let home = load_home(&state).await;

        assert!(home.watchlist.is_empty());
        assert_eq!(market.total_history_calls(), 0);
    }
}
