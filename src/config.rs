use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:4000/api";
pub const DEFAULT_STORAGE_DIR: &str = ".financst";
/// Every minute, at second 0 (format: sec min hour day month weekday).
pub const DEFAULT_SESSION_CHECK_CRON: &str = "0 * * * * *";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub storage_dir: PathBuf,
    pub session_check_cron: String,
    pub http_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            session_check_cron: DEFAULT_SESSION_CHECK_CRON.to_string(),
            http_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_url: lookup("FINANCST_API_URL").unwrap_or(defaults.api_url),
            storage_dir: lookup("FINANCST_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            session_check_cron: lookup("SESSION_CHECK_CRON").unwrap_or(defaults.session_check_cron),
            http_timeout: lookup("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.trim().is_empty() {
            return Err("FINANCST_API_URL is set but empty".to_string());
        }
        if self.session_check_cron.split_whitespace().count() < 6 {
            return Err(format!(
                "SESSION_CHECK_CRON must have six fields (sec min hour day month weekday), got {:?}",
                self.session_check_cron
            ));
        }
        Ok(())
    }
}
