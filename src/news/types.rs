// src/news/types.rs
use serde::{Deserialize, Deserializer};

use crate::window::TimeWindow;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Source {
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub country: String,
}

/// One article as returned by the news API. Immutable once fetched.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// May be empty; an empty id is never used as a dedup key.
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub id: String,
    #[serde(deserialize_with = "trimmed")]
    pub title: String,
    #[serde(deserialize_with = "trimmed")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub content: String,
    #[serde(deserialize_with = "http_url")]
    pub url: String,
    #[serde(deserialize_with = "http_url")]
    pub image: String,
    #[serde(rename = "publishedAt", deserialize_with = "trimmed")]
    pub published_at: String,
    #[serde(default, deserialize_with = "lenient_trimmed")]
    pub lang: String,
    #[serde(default)]
    pub source: Source,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct NewsResult {
    #[serde(rename = "totalArticles", default)]
    pub total_articles: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// A category-scoped news query. `None` means "nothing usable this time";
/// implementations log the cause themselves and never fail the caller.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_category(&self, category: &str, window: &TimeWindow) -> Option<NewsResult>;
    fn name(&self) -> &'static str;
}

fn trimmed<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let s = String::deserialize(d)?;
    Ok(s.trim().to_string())
}

// null and missing both collapse to ""
fn lenient_trimmed<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let s = Option::<String>::deserialize(d)?;
    Ok(s.map(|v| v.trim().to_string()).unwrap_or_default())
}

fn http_url<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let s = trimmed(d)?;
    let parsed = reqwest::Url::parse(&s).map_err(serde::de::Error::custom)?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(serde::de::Error::custom(format!(
            "expected an http(s) URL, got {s:?}"
        )));
    }
    Ok(s)
}
