use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use market_data::YahooSettings;
use market_data::remote::DEFAULT_BASE_URL;
use rust_decimal::Decimal;
use storage::StorageBackend;
use thiserror::Error;

use crate::classifier::DEFAULT_THRESHOLD;
use crate::monitor::MonitorSettings;
use crate::services::{AlertChannel, SmtpSettings};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key} ('{value}'): {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the binary needs to compose one run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub symbols_path: PathBuf,
    pub monitor: MonitorSettings,
    pub storage: StorageBackend,
    pub alert: AlertChannel,
    pub yahoo: YahooSettings,
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let threshold = vars.parsed("ALERT_THRESHOLD", DEFAULT_THRESHOLD, |v| {
            Decimal::from_str(v).map_err(|e| e.to_string())
        })?;
        if threshold <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                key: "ALERT_THRESHOLD",
                value: threshold.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let storage = match vars.or("STORAGE_BACKEND", "json").to_lowercase().as_str() {
            "json" => StorageBackend::JsonFile(PathBuf::from(
                vars.or("DIVIDEND_DATA_FILE", "dividend_data.json"),
            )),
            "sqlite" => {
                StorageBackend::Sqlite(vars.or("DATABASE_URL", "sqlite:dividend_state.db"))
            }
            "none" => StorageBackend::None,
            other => return Err(invalid("STORAGE_BACKEND", other, "expected json, sqlite or none")),
        };

        let alert = match vars.or("ALERT_CHANNEL", "email").to_lowercase().as_str() {
            "email" => AlertChannel::Email(SmtpSettings {
                server: vars.or("SMTP_SERVER", "smtp.gmail.com"),
                port: vars.parsed("SMTP_PORT", 465, |v| v.parse::<u16>().map_err(|e| e.to_string()))?,
                username: vars.required("GMAIL_ADDRESS")?,
                password: vars.required("GMAIL_APP_PASSWORD")?,
                from: vars.required("GMAIL_ADDRESS")?,
                to: vars.required("RECIPIENT_EMAIL")?,
            }),
            "telegram" => AlertChannel::Telegram {
                token: vars.required("TELEGRAM_BOT_TOKEN")?,
                chat_id: {
                    let raw = vars.required("TELEGRAM_CHAT_ID")?;
                    raw.parse::<i64>()
                        .map_err(|e| invalid("TELEGRAM_CHAT_ID", &raw, &e.to_string()))?
                },
            },
            "log" => AlertChannel::Log,
            other => return Err(invalid("ALERT_CHANNEL", other, "expected email, telegram or log")),
        };

        let yahoo = YahooSettings {
            base_url: vars.or("YAHOO_BASE_URL", DEFAULT_BASE_URL),
            range: vars.or("YAHOO_RANGE", "2y"),
            timeout: Duration::from_secs(vars.parsed("FETCH_TIMEOUT_SECS", 15, |v| {
                v.parse::<u64>().map_err(|e| e.to_string())
            })?),
        };

        Ok(Self {
            symbols_path: PathBuf::from(vars.or("STOCKS_FILE", "stocks.txt")),
            monitor: MonitorSettings { threshold },
            storage,
            alert,
            yahoo,
        })
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    // Empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T>(
        &self,
        key: &'static str,
        default: T,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => parse(&raw).map_err(|reason| invalid(key, &raw, &reason)),
            None => Ok(default),
        }
    }
}
