use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{
    AuthResponse, ContactMessage, Credentials, GoogleLoginRequest, MessageResponse, NewWatchlistEntry,
    PingResponse, SignupRequest, User, UserResponse, UserUpdate,
};

/// Account, watchlist and contact endpoints (`/auth`, `/user`, `/contact`).
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AppError>;

    async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, AppError>;

    async fn google_login(&self, request: &GoogleLoginRequest) -> Result<AuthResponse, AppError>;

    async fn get_user(&self, user_id: &str) -> Result<User, AppError>;

    async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<UserResponse, AppError>;

    async fn delete_user(&self, user_id: &str) -> Result<MessageResponse, AppError>;

    /// The API rejects a symbol that is already on the user's watchlist.
    async fn add_watchlist_entry(
        &self,
        user_id: &str,
        entry: &NewWatchlistEntry,
    ) -> Result<UserResponse, AppError>;

    async fn delete_watchlist_entry(&self, user_id: &str, symbol: &str) -> Result<UserResponse, AppError>;

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse, AppError>;

    async fn reset_password(&self, reset_token: &str, password: &str) -> Result<MessageResponse, AppError>;

    async fn send_contact_message(&self, message: &ContactMessage) -> Result<MessageResponse, AppError>;

    async fn ping(&self) -> Result<PingResponse, AppError>;
}
