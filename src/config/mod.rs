use std::env;
use std::time::Duration;

use crate::error::AppError;

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
    pub polling: PollingConfig,
}

/// Assessment backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Pre-issued bearer token, if any
    pub token: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Per-request timeout. Unset means the poll interval bounds staleness.
    pub timeout_ms: Option<u64>,
}

/// Poll interval configuration
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Interval for the follow-up question page
    pub followup_interval_ms: u64,
    /// Interval for the report page
    pub report_interval_ms: u64,
}

impl PollingConfig {
    pub fn followup_interval(&self) -> Duration {
        Duration::from_millis(self.followup_interval_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            followup_interval_ms: 10_000,
            report_interval_ms: 15_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = env::var("ASSESSMENT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::Config {
                message: format!("ASSESSMENT_API_URL must be an http(s) URL, got '{}'", base_url),
            });
        }

        let api = ApiConfig {
            base_url,
            token: env::var("ASSESSMENT_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0),
        };

        let defaults = PollingConfig::default();
        let polling = PollingConfig {
            followup_interval_ms: parse_interval("POLL_INTERVAL_MS")?
                .unwrap_or(defaults.followup_interval_ms),
            report_interval_ms: parse_interval("REPORT_POLL_INTERVAL_MS")?
                .unwrap_or(defaults.report_interval_ms),
        };

        Ok(Config {
            api,
            logging,
            request,
            polling,
        })
    }
}

fn parse_interval(key: &str) -> Result<Option<u64>, AppError> {
    match env::var(key) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(AppError::Config {
                message: format!("{} must be a positive number of milliseconds, got '{}'", key, raw),
            }),
            Ok(ms) => Ok(Some(ms)),
        },
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_defaults() {
        let polling = PollingConfig::default();
        assert_eq!(polling.followup_interval(), Duration::from_secs(10));
        assert_eq!(polling.report_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_request_config_default_has_no_timeout() {
        assert!(RequestConfig::default().timeout_ms.is_none());
    }
}
