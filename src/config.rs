use std::env;
use std::time::Duration;
use validator::Validate;

use crate::http::Endpoints;

const DEFAULT_BASE_URL: &str = "http://localhost:7071/api";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug, Validate)]
pub struct Config {
    /// Endpoint returning the full job list
    #[validate(url(message = "JOBS_DATA_URL must be a valid URL"))]
    pub data_url: String,

    /// Endpoint accepting single-field updates
    #[validate(url(message = "JOBS_UPDATE_URL must be a valid URL"))]
    pub update_url: String,

    /// Endpoint accepting new jobs
    #[validate(url(message = "JOBS_INSERT_URL must be a valid URL"))]
    pub insert_url: String,

    /// Wait between a successful write and the refresh it triggers
    /// Default: 1000
    #[validate(range(max = 60000, message = "REFRESH_DELAY_MS must be at most 60000"))]
    pub refresh_delay_ms: u64,

    /// Directory for rolling log files
    pub log_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Optional environment variables:
    /// - JOBS_API_BASE_URL: prefix for the three endpoints (default: http://localhost:7071/api)
    /// - JOBS_DATA_URL / JOBS_UPDATE_URL / JOBS_INSERT_URL: per-endpoint overrides
    /// - REFRESH_DELAY_MS: refresh delay after a write (default: 1000)
    /// - LOG_DIR: log directory (default: logs)
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = lookup("JOBS_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base = base.trim_end_matches('/');

        let refresh_delay_ms = match lookup("REFRESH_DELAY_MS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("REFRESH_DELAY_MS must be a number of milliseconds, got {:?}", raw))?,
            None => 1000,
        };

        let config = Config {
            data_url: lookup("JOBS_DATA_URL").unwrap_or_else(|| format!("{}/data", base)),
            update_url: lookup("JOBS_UPDATE_URL").unwrap_or_else(|| format!("{}/update", base)),
            insert_url: lookup("JOBS_INSERT_URL").unwrap_or_else(|| format!("{}/insert", base)),
            refresh_delay_ms,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        };
        config.check()?;
        Ok(config)
    }

    /// Point all three endpoints at a new base URL
    pub fn with_base_url(mut self, base: &str) -> Result<Self, String> {
        let base = base.trim_end_matches('/');
        self.data_url = format!("{}/data", base);
        self.update_url = format!("{}/update", base);
        self.insert_url = format!("{}/insert", base);
        self.check()?;
        Ok(self)
    }

    pub fn with_refresh_delay_ms(mut self, refresh_delay_ms: u64) -> Result<Self, String> {
        self.refresh_delay_ms = refresh_delay_ms;
        self.check()?;
        Ok(self)
    }

    fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| {
            let mut messages: Vec<String> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid configuration value: {}", field))
                    })
                })
                .collect();
            messages.sort();
            messages.join("; ")
        })
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            data_url: self.data_url.clone(),
            update_url: self.update_url.clone(),
            insert_url: self.insert_url.clone(),
        }
    }
}
