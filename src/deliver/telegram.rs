use std::sync::RwLock;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{render_caption, Delivery};
use crate::config::{AppConfig, Secret};
use crate::news::Article;

/// Posts articles as `sendPhoto` messages through the Telegram Bot API.
pub struct TelegramDelivery {
    api_base: String,
    token: Secret,
    chat_id: Secret,
    read_more: String,
    timeout: Duration,
    // None once the session is closed
    client: RwLock<Option<Client>>,
}

impl TelegramDelivery {
    pub fn new(api_base: impl Into<String>, token: Secret, chat_id: Secret) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            chat_id,
            read_more: "Читать подробнее".to_string(),
            timeout: Duration::from_secs(30),
            client: RwLock::new(Some(Client::new())),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.tg_api_base.clone(),
            cfg.tg_bot_token.clone(),
            cfg.tg_chat_id.clone(),
        )
        .with_timeout(cfg.tg_timeout())
        .with_read_more(cfg.read_more_label.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_read_more(mut self, label: impl Into<String>) -> Self {
        self.read_more = label.into();
        self
    }

    pub fn is_closed(&self) -> bool {
        self.client.read().map(|g| g.is_none()).unwrap_or(true)
    }

    fn session(&self) -> Option<Client> {
        self.client.read().ok().and_then(|g| g.clone())
    }

    async fn send_photo(&self, article: &Article) -> Result<()> {
        let client = self
            .session()
            .ok_or_else(|| anyhow!("telegram session is closed"))?;

        let payload = SendPhoto {
            chat_id: self.chat_id.expose(),
            photo: &article.image,
            caption: render_caption(article, &self.read_more),
            parse_mode: "HTML",
        };
        let url = format!("{}/bot{}/sendPhoto", self.api_base, self.token.expose());

        // the bot token sits in the path, so reqwest errors must not echo the url
        let rsp = client
            .post(url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("telegram request failed")?;

        let status = rsp.status();
        let body = rsp
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("reading telegram response")?;
        let parsed: Option<BotApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(r) if r.ok && status.is_success() => Ok(()),
            Some(r) => Err(anyhow!(
                "telegram HTTP {status}: {}",
                r.description.unwrap_or_else(|| "no description".to_string())
            )),
            None => Err(anyhow!("telegram HTTP {status}: unreadable response")),
        }
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn deliver(&self, article: &Article) -> bool {
        match self.send_photo(article).await {
            Ok(()) => true,
            Err(e) => {
                error!(target: "deliver", id = %article.id, error = %format!("{e:#}"), "cannot send telegram message");
                false
            }
        }
    }

    async fn shutdown(&self) {
        let taken = match self.client.write() {
            Ok(mut g) => g.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if taken.is_some() {
            info!(target: "deliver", "telegram session closed");
        }
    }
}

#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: String,
    parse_mode: &'static str,
}

#[derive(Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_is_idempotent_and_blocks_sends() {
        let tg = TelegramDelivery::new("http://127.0.0.1:9", Secret::new("t"), Secret::new("c"));
        assert!(!tg.is_closed());
        tg.shutdown().await;
        assert!(tg.is_closed());
        tg.shutdown().await;
        assert!(tg.is_closed());
        assert!(tg.session().is_none());
    }

    #[test]
    fn trailing_slash_in_base_is_dropped() {
        let tg = TelegramDelivery::new("https://api.telegram.org/", Secret::new("t"), Secret::new("c"));
        assert_eq!(tg.api_base, "https://api.telegram.org");
    }
}
