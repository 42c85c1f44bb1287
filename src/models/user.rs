use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::numeric::opt_f64_lenient;

// ==============================================================================
// User Models
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub watch_list: Vec<WatchlistEntry>,
}

impl User {
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.watch_list.iter().any(|entry| entry.symbol == symbol)
    }
}

/// A watchlist membership entry as stored with the user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub symbol: String,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub add_price: Option<f64>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl WatchlistEntry {
    pub fn stock(symbol: impl Into<String>) -> Self {
        Self {
            kind: "Stock".to_string(),
            symbol: symbol.into(),
            add_price: None,
            added_at: None,
            notes: None,
        }
    }
}

/// Body of `POST /user/:id/watchlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWatchlistEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub symbol: String,
    pub add_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ==============================================================================
// Auth Requests / Responses
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Google sign-in accepts either an ID-token credential or an OAuth access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoogleLoginRequest {
    Credential(String),
    AccessToken(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Response of the user endpoints that return the refreshed user record.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), String> {
        let fields = [&self.name, &self.surname, &self.email, &self.message];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err("All fields are required.".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub message: String,
    #[serde(default)]
    pub db_status: Option<String>,
    pub server_time: DateTime<Utc>,
}
