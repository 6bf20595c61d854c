// config.rs
use crate::browser::BrowserConfig;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TARGET_URL: &str = "https://clearrecon-ca.com/california-listings/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Brevo credentials. Email is only attempted when all of them are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub output_dir: PathBuf,
    pub target_url: String,
    pub max_pages: NonZeroUsize,
    pub browser: BrowserConfig,
    pub log_level: String,
    pub email: Option<EmailConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = parse_or(&get, "BIND_ADDR", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(&get, "PORT", 8089)?;

        let target_url = get("TARGET_URL").unwrap_or_else(|| DEFAULT_TARGET_URL.to_string());
        url::Url::parse(&target_url).map_err(|e| ConfigError::Invalid {
            name: "TARGET_URL",
            value: target_url.clone(),
            reason: e.to_string(),
        })?;

        let max_pages = parse_or(&get, "MAX_PAGES", NonZeroUsize::new(50).unwrap_or(NonZeroUsize::MIN))?;

        let mut browser = BrowserConfig {
            headless: parse_bool(&get, "HEADLESS", true)?,
            sandbox: parse_bool(&get, "CHROME_SANDBOX", false)?,
            chrome_path: get("CHROME_PATH").map(PathBuf::from),
            ..BrowserConfig::default()
        };
        if let Some(agent) = get("USER_AGENT") {
            browser.user_agent = agent;
        }
        let timeout_secs: u64 = parse_or(&get, "PAGE_LOAD_TIMEOUT_SECS", 30)?;
        browser.page_load_timeout = Duration::from_secs(timeout_secs);

        let email = match (get("BREVO_API_KEY"), get("SENDER_EMAIL")) {
            (Some(api_key), Some(sender_email)) => Some(EmailConfig {
                api_key,
                sender_email,
                sender_name: get("SENDER_NAME").unwrap_or_else(|| "Foreclosure Scraper".into()),
            }),
            _ => None,
        };

        Ok(Self {
            bind: SocketAddr::new(host, port),
            output_dir: get("OUTPUT_DIR").map_or_else(|| PathBuf::from("csv_data"), PathBuf::from),
            target_url,
            max_pages,
            browser,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            email,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool<G>(get: &G, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let Some(value) = get(name) else {
        return Ok(default);
    };

    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected true or false".into(),
        }),
    }
}
