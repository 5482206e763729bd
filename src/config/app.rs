// src/config/app.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::Secret;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const ENV_CONFIG_PATH: &str = "NUNTIUS_CONFIG_PATH";

/// Upper bound for `news_delay_hours + news_period_hours` (a century).
pub const MAX_WINDOW_SPAN_HOURS: u64 = 24 * 365 * 100;

/// Keys that are read from the environment (`.env`) unless the TOML file sets them.
const SECRET_KEYS: [&str; 3] = ["tg_bot_token", "tg_chat_id", "news_api_token"];

fn default_app_name() -> String {
    "Nuntius Mutationum".to_string()
}
fn default_app_version() -> String {
    "1.0.0".to_string()
}
fn default_tg_api_base() -> String {
    "https://api.telegram.org".to_string()
}
fn default_news_api_endpoint() -> String {
    "https://gnews.io/api/v4/top-headlines".to_string()
}
fn default_news_lang() -> String {
    "ru".to_string()
}
fn default_news_categories() -> Vec<String> {
    vec!["general".to_string()]
}
fn default_read_more_label() -> String {
    "Читать подробнее".to_string()
}
fn default_log_path() -> PathBuf {
    PathBuf::from("logs/main.log")
}
fn default_log_level() -> String {
    "INFO".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_version")]
    pub app_version: String,

    #[serde(default)]
    pub tg_bot_token: Secret,
    #[serde(default)]
    pub tg_chat_id: Secret,
    #[serde(default)]
    pub news_api_token: Secret,

    /// Bot API root; overridable so tests can point at a local server.
    #[serde(default = "default_tg_api_base")]
    pub tg_api_base: String,
    #[serde(default = "default_tg_timeout_sec")]
    pub tg_timeout_sec: u64,

    #[serde(default = "default_news_api_endpoint")]
    pub news_api_endpoint: String,
    #[serde(default = "one")]
    pub news_api_timeout_sec: u64,
    #[serde(default = "default_news_lang")]
    pub news_lang: String,
    #[serde(default = "default_news_categories")]
    pub news_categories: Vec<String>,
    #[serde(default = "one")]
    pub news_max_articles: u32,
    #[serde(default = "default_delay_hours")]
    pub news_delay_hours: u32,
    #[serde(default = "default_period_hours")]
    pub news_period_hours: u32,

    /// Pause before each Telegram send (rate-limit courtesy).
    #[serde(default = "default_delivery_pace_ms")]
    pub delivery_pace_ms: u64,
    #[serde(default = "default_read_more_label")]
    pub read_more_label: String,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn one<T: From<u8>>() -> T {
    T::from(1)
}
fn default_tg_timeout_sec() -> u64 {
    30
}
fn default_delay_hours() -> u32 {
    12
}
fn default_period_hours() -> u32 {
    3
}
fn default_delivery_pace_ms() -> u64 {
    2100
}

impl AppConfig {
    pub fn news_api_timeout(&self) -> Duration {
        Duration::from_secs(self.news_api_timeout_sec)
    }

    pub fn tg_timeout(&self) -> Duration {
        Duration::from_secs(self.tg_timeout_sec)
    }

    pub fn delivery_pace(&self) -> Duration {
        Duration::from_millis(self.delivery_pace_ms)
    }

    fn normalize(&mut self) {
        for s in [
            &mut self.app_name,
            &mut self.app_version,
            &mut self.tg_api_base,
            &mut self.news_api_endpoint,
            &mut self.news_lang,
            &mut self.read_more_label,
            &mut self.log_level,
        ] {
            *s = s.trim().to_string();
        }
        self.news_categories = self
            .news_categories
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
    }

    fn validate(&self) -> Result<()> {
        if self.tg_bot_token.is_empty() {
            bail!("Telegram bot token is empty!");
        }
        if self.tg_chat_id.is_empty() {
            bail!("Telegram chat ID is empty!");
        }
        if self.news_api_token.is_empty() {
            bail!("News API token is empty!");
        }
        if self.news_api_timeout_sec < 1 {
            bail!("news_api_timeout_sec must be >= 1");
        }
        if self.tg_timeout_sec < 1 {
            bail!("tg_timeout_sec must be >= 1");
        }
        if self.news_max_articles < 1 {
            bail!("news_max_articles must be >= 1");
        }
        if self.news_period_hours < 1 {
            bail!("news_period_hours must be >= 1");
        }
        let span = u64::from(self.news_delay_hours) + u64::from(self.news_period_hours);
        if span > MAX_WINDOW_SPAN_HOURS {
            bail!("news_delay_hours + news_period_hours must be <= {MAX_WINDOW_SPAN_HOURS}");
        }
        if self.news_categories.is_empty() {
            bail!("news_categories must list at least one category");
        }
        if self.news_api_endpoint.is_empty() {
            bail!("news_api_endpoint is empty");
        }
        Ok(())
    }
}

/// Build and validate a config from an env lookup plus optional TOML text.
/// Values present in the TOML win over the environment.
pub fn load_config_from<F>(env: F, toml_src: Option<&str>) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut table: toml::Table = match toml_src {
        Some(s) => toml::from_str(s).context("parsing config TOML")?,
        None => toml::Table::new(),
    };

    for key in SECRET_KEYS {
        if table.contains_key(key) {
            continue;
        }
        let value = env(key).or_else(|| env(&key.to_ascii_uppercase()));
        if let Some(v) = value {
            table.insert(key.to_string(), toml::Value::String(v));
        }
    }

    let mut cfg: AppConfig = toml::Value::Table(table)
        .try_into()
        .context("decoding configuration")?;
    cfg.normalize();
    cfg.validate()?;
    Ok(cfg)
}

/// Startup loader: `.env` is mandatory, the TOML file is optional.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    dotenvy::dotenv().map_err(|e| anyhow!("Cannot load .env file! Check file or key values. ({e})"))?;

    let toml_src = match std::fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("reading config from {}", path.display()));
        }
    };

    load_config_from(|k| std::env::var(k).ok(), toml_src.as_deref())
}

/// Resolve the config path: `$NUNTIUS_CONFIG_PATH`, else `config.toml`.
pub fn config_path_default() -> PathBuf {
    std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
