use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::{redirect::Policy, Client};
use tracing::{error, info};

use crate::config::{AppConfig, Secret};
use crate::news::types::{NewsResult, NewsSource};
use crate::telemetry::{ARTICLES_FETCHED_TOTAL, FETCH_ERRORS_TOTAL};
use crate::window::TimeWindow;

/// GNews `top-headlines` client. One GET per category per cycle, no retries.
pub struct GNewsClient {
    client: Client,
    endpoint: String,
    lang: String,
    max_articles: u32,
    api_key: Secret,
    timeout: Duration,
}

impl GNewsClient {
    pub fn new(
        endpoint: impl Into<String>,
        lang: impl Into<String>,
        max_articles: u32,
        api_key: Secret,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(10))
            .build()
            .context("building news http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            lang: lang.into(),
            max_articles,
            api_key,
            timeout,
        })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        Self::new(
            cfg.news_api_endpoint.clone(),
            cfg.news_lang.clone(),
            cfg.news_max_articles,
            cfg.news_api_token.clone(),
            cfg.news_api_timeout(),
        )
    }

    /// Query parameters in wire order. `apikey` is last.
    pub fn request_params(&self, category: &str, window: &TimeWindow) -> Vec<(&'static str, String)> {
        vec![
            ("lang", self.lang.clone()),
            ("category", category.to_string()),
            ("max", self.max_articles.to_string()),
            ("from", window.from_param()),
            ("to", window.to_param()),
            ("apikey", self.api_key.expose().to_string()),
        ]
    }

    /// Same as `request_params` but safe to log.
    pub fn redacted_params(&self, category: &str, window: &TimeWindow) -> Vec<(&'static str, String)> {
        let mut params = self.request_params(category, window);
        for (k, v) in params.iter_mut() {
            if *k == "apikey" {
                *v = self.api_key.to_string();
            }
        }
        params
    }

    pub async fn try_fetch(&self, category: &str, window: &TimeWindow) -> Result<NewsResult> {
        info!(
            target: "news",
            endpoint = %self.endpoint,
            params = ?self.redacted_params(category, window),
            "sending news request"
        );

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.request_params(category, window))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(strip_url)
            .context("news http get")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("news API answered HTTP {status}");
        }
        info!(target: "news", status = status.as_u16(), "news API request succeeded");

        let body = resp.text().await.map_err(strip_url).context("reading news body")?;
        let news = parse_news(&body)?;
        info!(target: "news", articles = news.articles.len(), "processed news articles");
        Ok(news)
    }
}

/// Parse a response body into `NewsResult`.
pub fn parse_news(body: &str) -> Result<NewsResult> {
    let news: NewsResult = serde_json::from_str(body).context("parsing news JSON")?;
    counter!(ARTICLES_FETCHED_TOTAL).increment(news.articles.len() as u64);
    Ok(news)
}

// reqwest errors carry the full request URL, which includes the api key
fn strip_url(e: reqwest::Error) -> reqwest::Error {
    e.without_url()
}

#[async_trait]
impl NewsSource for GNewsClient {
    async fn fetch_category(&self, category: &str, window: &TimeWindow) -> Option<NewsResult> {
        match self.try_fetch(category, window).await {
            Ok(news) => Some(news),
            Err(e) => {
                error!(target: "news", error = %format!("{e:#}"), category, "news request failed");
                counter!(FETCH_ERRORS_TOTAL).increment(1);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "GNews"
    }
}
