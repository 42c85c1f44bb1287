use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{
    AuthResponse, ContactMessage, Credentials, GoogleLoginRequest, MessageResponse, NewWatchlistEntry,
    SignupRequest, User, UserUpdate, WatchlistEntry,
};
use crate::state::AppState;

/// Ends the session when the server rejects our token.
fn guard<T>(state: &AppState, result: Result<T, AppError>) -> Result<T, AppError> {
    if let Err(e) = &result {
        if e.is_unauthorized() {
            warn!("Server rejected the session token, signing out");
            state.auth.expire();
        }
    }
    result
}

fn require_user(state: &AppState) -> Result<User, AppError> {
    if !state.auth.is_authenticated() {
        return Err(AppError::Unauthorized);
    }
    state.auth.user().ok_or(AppError::Unauthorized)
}

/// Stores the session and warms the caches the home page reads first.
async fn start_session(state: &AppState, resp: AuthResponse) -> User {
    let AuthResponse { user, token } = resp;
    state.auth.set_login(user.clone(), token);

    state.stocks.fetch_dashboard_data(true).await;
    if !user.watch_list.is_empty() {
        state.stocks.fetch_watchlist_prices(&user.watch_list).await;
    }
    user
}

// ==============================================================================
// Sign in / sign out
// ==============================================================================

pub async fn login_user(state: &AppState, credentials: &Credentials) -> Result<User, AppError> {
    let resp = state.user_api.login(credentials).await.map_err(|e| {
        warn!("Login failed for {}: {}", credentials.email, e);
        e
    })?;
    Ok(start_session(state, resp).await)
}

pub async fn signup_user(state: &AppState, request: &SignupRequest) -> Result<User, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }
    let resp = state.user_api.signup(request).await.map_err(|e| {
        warn!("Signup failed for {}: {}", request.email, e);
        e
    })?;
    info!("👤 Created account {}", resp.user.email);
    Ok(start_session(state, resp).await)
}

pub async fn google_login(state: &AppState, request: &GoogleLoginRequest) -> Result<User, AppError> {
    let resp = state.user_api.google_login(request).await.map_err(|e| {
        warn!("Google sign-in failed: {}", e);
        e
    })?;
    Ok(start_session(state, resp).await)
}

pub fn logout_user(state: &AppState) -> MessageResponse {
    state.auth.expire();
    MessageResponse {
        message: "Logged out successfully".to_string(),
    }
}

// ==============================================================================
// Profile
// ==============================================================================

pub async fn get_current_user(state: &AppState) -> Result<User, AppError> {
    let current = require_user(state)?;
    let user = guard(state, state.user_api.get_user(&current.id).await)?;
    state.auth.update_user(user.clone());
    Ok(user)
}

pub async fn update_current_user(state: &AppState, update: &UserUpdate) -> Result<User, AppError> {
    let current = require_user(state)?;
    if update.new_password.is_some() && update.current_password.is_none() {
        return Err(AppError::Validation("Current password is required to set a new one".into()));
    }
    let resp = guard(state, state.user_api.update_user(&current.id, update).await)?;
    state.auth.update_user(resp.user.clone());
    Ok(resp.user)
}

pub async fn delete_current_user(state: &AppState) -> Result<MessageResponse, AppError> {
    let current = require_user(state)?;
    let resp = guard(state, state.user_api.delete_user(&current.id).await)?;
    info!("👤 Deleted account {}", current.email);
    state.auth.expire();
    Ok(resp)
}

// ==============================================================================
// Watchlist
// ==============================================================================

pub async fn add_symbol_to_watchlist(state: &AppState, entry: &NewWatchlistEntry) -> Result<User, AppError> {
    let current = require_user(state)?;
    let symbol = entry.symbol.trim();
    if symbol.is_empty() {
        return Err(AppError::Validation("Symbol cannot be empty".into()));
    }
    if current.has_symbol(symbol) {
        return Err(AppError::Validation(format!("{} is already in your watchlist", symbol)));
    }

    let entry = NewWatchlistEntry {
        symbol: symbol.to_string(),
        ..entry.clone()
    };
    let resp = guard(state, state.user_api.add_watchlist_entry(&current.id, &entry).await)?;
    info!("⭐ Added {} to watchlist", entry.symbol);
    state.auth.update_user(resp.user.clone());
    state.stocks.fetch_watchlist_prices(&resp.user.watch_list).await;
    Ok(resp.user)
}

pub async fn delete_symbol_from_watchlist(state: &AppState, symbol: &str) -> Result<User, AppError> {
    let current = require_user(state)?;
    let resp = guard(state, state.user_api.delete_watchlist_entry(&current.id, symbol).await)?;
    info!("Removed {} from watchlist", symbol);
    state.stocks.forget_watchlist_price(symbol);
    state.auth.update_user(resp.user.clone());
    Ok(resp.user)
}

/// Manual refresh of the home page.
pub async fn refresh_home(state: &AppState, entries: &[WatchlistEntry]) {
    state.stocks.fetch_dashboard_data(true).await;
    state.stocks.fetch_watchlist_prices(entries).await;
}

// ==============================================================================
// Password reset / contact
// ==============================================================================

pub async fn forgot_password(state: &AppState, email: &str) -> Result<MessageResponse, AppError> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    state.user_api.forgot_password(email).await
}

pub async fn reset_password(state: &AppState, reset_token: &str, password: &str) -> Result<MessageResponse, AppError> {
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    state.user_api.reset_password(reset_token, password).await
}

pub async fn send_contact_message(state: &AppState, message: &ContactMessage) -> Result<MessageResponse, AppError> {
    message.validate().map_err(AppError::Validation)?;
    state.user_api.send_contact_message(message).await
}
