use std::sync::Arc;

use parking_lot::RwLock;

/// Shared bearer token slot.
///
/// The session writes it on login/logout and the HTTP client reads it for every
/// request, so neither side needs a reference to the other.
#[derive(Clone, Default)]
pub struct TokenHandle {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    pub fn set(&self, token: Option<String>) {
        *self.inner.write() = token;
    }

    pub fn bearer(&self) -> Option<String> {
        self.get().map(|token| format!("Bearer {}", token))
    }
}
