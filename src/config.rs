use std::{env, path::PathBuf, time::Duration};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
const DEFAULT_GEO_API: &str = "http://ip-api.com";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub telegram_token: Option<String>,
    pub telegram_api_base: String,
    pub geo_api_base: String,
    pub geo_timeout: Duration,
    pub poll_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("data"),
            telegram_token: None,
            telegram_api_base: DEFAULT_TELEGRAM_API.to_string(),
            geo_api_base: DEFAULT_GEO_API.to_string(),
            geo_timeout: Duration::from_millis(3000),
            poll_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_var("PORT").unwrap_or(defaults.port),
            data_dir: env::var("APP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            telegram_token: env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or(defaults.telegram_api_base),
            geo_api_base: env::var("GEO_API_BASE").unwrap_or(defaults.geo_api_base),
            geo_timeout: parse_var("GEO_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.geo_timeout),
            poll_timeout: parse_var("TELEGRAM_POLL_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_timeout),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse::<T>().ok())
}
