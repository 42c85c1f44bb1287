use std::sync::Arc;

use jsonwebtoken::{decode, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::external::TokenHandle;
use crate::models::User;
use crate::store::clock::Clock;
use crate::store::persistence::{load_json, save_json, StateStorage};
use crate::store::stock_store::StockStore;

/// Durable slot holding the signed-in user and bearer token.
pub const AUTH_STORAGE_KEY: &str = "auth-storage";

/// Per-user cached data that must not outlive the session.
pub trait SessionCache: Send + Sync {
    fn reset_store(&self);
}

impl SessionCache for StockStore {
    fn reset_store(&self) {
        StockStore::reset_store(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Outcome of a client-side token check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No token held.
    Anonymous,
    Valid,
    /// `exp` is in the past. The session was ended.
    Expired,
    /// The token could not be decoded. The session was ended.
    Invalid,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Reads `exp` from a JWT payload. The signature is not checked: the server
/// remains the authority, this only avoids using a token that is known dead.
fn decode_expiry(token: &str) -> Result<Option<i64>, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims.exp)
}

/// The signed-in user, their token and the authenticated flag.
///
/// Ending a session, whether by logout, a rejected token or local expiry,
/// always wipes the session cache as well.
pub struct AuthStore {
    session: RwLock<Session>,
    token: TokenHandle,
    cache: Arc<dyn SessionCache>,
    storage: Arc<dyn StateStorage>,
    clock: Arc<dyn Clock>,
}

impl AuthStore {
    pub fn new(
        token: TokenHandle,
        cache: Arc<dyn SessionCache>,
        storage: Arc<dyn StateStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut session: Session = load_json(storage.as_ref(), AUTH_STORAGE_KEY).unwrap_or_default();
        if session.is_authenticated && session.token.is_none() {
            warn!("Persisted session has no token, starting signed out");
            session = Session::default();
        }
        if let Some(user) = &session.user {
            info!("🔐 Restored session for {}", user.email);
        }
        token.set(session.token.clone());

        Self {
            session: RwLock::new(session),
            token,
            cache,
            storage,
            clock,
        }
    }

    pub fn session(&self) -> Session {
        self.session.read().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.session.read().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.session.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_authenticated
    }

    pub fn set_login(&self, user: User, token: String) {
        info!("🔐 Signed in as {}", user.email);
        {
            let mut session = self.session.write();
            *session = Session {
                user: Some(user),
                token: Some(token.clone()),
                is_authenticated: true,
            };
        }
        self.token.set(Some(token));
        self.persist();
    }

    /// Clears the session without touching the cache.
    /// Signs out and deletes the durable session slot.
    pub fn set_logout(&self) {
        *self.session.write() = Session::default();
        self.token.set(None);
        if let Err(e) = self.storage.remove(AUTH_STORAGE_KEY) {
            warn!("Failed to remove persisted session: {}", e);
        }
    }

    /// Replaces the user record after a profile or watchlist change. Ignored when signed out.
    pub fn update_user(&self, user: User) {
        {
            let mut session = self.session.write();
            if !session.is_authenticated {
                debug!("Ignoring user update while signed out");
                return;
            }
            session.user = Some(user);
        }
        self.persist();
    }

    /// Ends the session and wipes every per-user cache.
    pub fn expire(&self) {
        info!("🚪 Session ended, clearing cached data");
        self.set_logout();
        self.cache.reset_store();
    }

    /// Ends the session if the held token has expired or cannot be read.
    pub fn check_session(&self) -> SessionStatus {
        let Some(token) = self.token() else {
            return SessionStatus::Anonymous;
        };

        let now_ms = self.clock.now().timestamp_millis();
        match decode_expiry(&token) {
            Ok(Some(exp)) if exp.saturating_mul(1000) < now_ms => {
                warn!("⏰ Session token expired at {}, signing out", exp);
                self.expire();
                SessionStatus::Expired
            }
            Ok(_) => {
                debug!("Session valid");
                SessionStatus::Valid
            }
            Err(e) => {
                warn!("Session token unreadable ({}), signing out", e);
                self.expire();
                SessionStatus::Invalid
            }
        }
    }

    fn persist(&self) {
        let session = self.session.read().clone();
        save_json(self.storage.as_ref(), AUTH_STORAGE_KEY, &session);
    }
}
