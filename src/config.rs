use std::time::Duration;

// ============================================================================
// API Configuration
// ============================================================================
//
// Read from the environment (and a `.env` file, if present):
// - ORDER_API_BASE_URL      default http://localhost:5000/api
// - ORDER_API_TIMEOUT_SECS  default 30
// - ORDER_API_TOKEN         optional bearer token
//
// ============================================================================

pub const BASE_URL_ENV: &str = "ORDER_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "ORDER_API_TIMEOUT_SECS";
pub const TOKEN_ENV: &str = "ORDER_API_TOKEN";

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive whole number of seconds, got {value:?}")]
    InvalidTimeout { key: &'static str, value: String },
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build from an arbitrary key lookup; missing or blank keys fall back to
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = read(BASE_URL_ENV)
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match read(TIMEOUT_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout { key: TIMEOUT_ENV, value: raw }),
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            timeout,
            token: read(TOKEN_ENV),
        })
    }
}

/// Ensure a scheme (http for localhost, https otherwise) and strip trailing
/// slashes.
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}
