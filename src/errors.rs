use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),
    /// The API answered with a non-success status and an `{ "error": ... }` body.
    #[error("{0}")]
    Api(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl AppError {
    /// Map a non-success HTTP status plus the server's error message.
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized,
            StatusCode::NOT_FOUND => {
                AppError::NotFound(message.unwrap_or_else(|| "Not found".to_string()))
            }
            _ => AppError::Api(message.unwrap_or_else(|| format!("Request failed with status {}", status))),
        }
    }

    /// The message shown to a user for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) => "Network error".to_string(),
            AppError::Api(msg) | AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            AppError::Parse(value.to_string())
        } else {
            AppError::Network(value.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Parse(value.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Storage(value.to_string())
    }
}
