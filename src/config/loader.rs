use std::{env, time::Duration};

use url::Url;

use super::env::{
    ApiConfig, AppConfig, ConfigError, DirectoryConfig, LoggingConfig, PollConfig, ViewConfig,
};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_UNCATEGORIZED: &str = "Yok;Not Specified";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let raw_url = var("REELSPIRIT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|err| ConfigError::Invalid {
            key: "REELSPIRIT_API_URL",
            reason: err.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "REELSPIRIT_API_URL",
                reason: format!("unsupported scheme {}", base_url.scheme()),
            });
        }

        let api = ApiConfig {
            base_url,
            request_timeout: parse_millis(var("REQUEST_TIMEOUT_MS"), "REQUEST_TIMEOUT_MS", 15_000)?,
        };

        let poll = PollConfig {
            interval: parse_millis(var("POLL_INTERVAL_MS"), "POLL_INTERVAL_MS", 5_000)?,
        };

        let view = ViewConfig {
            uncategorized_labels: var("UNCATEGORIZED_LABELS")
                .unwrap_or_else(|| DEFAULT_UNCATEGORIZED.to_string())
                .split(';')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        Ok(Self {
            api,
            poll,
            view,
            logging,
            directories,
        })
    }
}

fn parse_millis(
    value: Option<String>,
    key: &'static str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_millis(default_ms));
    };
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(err) => Err(ConfigError::Invalid {
            key,
            reason: err.to_string(),
        }),
    }
}
