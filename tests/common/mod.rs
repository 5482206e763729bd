// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use nuntius::news::Source;
use nuntius::{Article, Delivery, NewsResult, NewsSource, RelaySettings, TimeWindow};

pub fn article(id: &str, title: &str) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} description"),
        content: String::new(),
        url: format!("https://news.example/{title}"),
        image: format!("https://img.example/{title}.jpg"),
        published_at: "2025-03-09T21:00:00Z".to_string(),
        lang: "en".to_string(),
        source: Source {
            name: "Example".to_string(),
            ..Source::default()
        },
    }
}

pub fn news(articles: Vec<Article>) -> NewsResult {
    NewsResult {
        total_articles: articles.len() as u64,
        articles,
    }
}

pub fn settings(categories: &[&str]) -> RelaySettings {
    RelaySettings {
        categories: categories.iter().map(|c| c.to_string()).collect(),
        delay_hours: 12,
        period_hours: 3,
        pace: Duration::ZERO,
    }
}

/// Answers each category from a fixed table; unknown categories yield `None`.
#[derive(Default)]
pub struct ScriptedSource {
    responses: HashMap<String, NewsResult>,
    pub calls: Mutex<Vec<(String, TimeWindow)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: &str, result: NewsResult) -> Self {
        self.responses.insert(category.to_string(), result);
        self
    }

    pub fn categories_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }
}

#[async_trait]
impl NewsSource for ScriptedSource {
    async fn fetch_category(&self, category: &str, window: &TimeWindow) -> Option<NewsResult> {
        self.calls
            .lock()
            .unwrap()
            .push((category.to_string(), *window));
        self.responses.get(category).cloned()
    }

    fn name(&self) -> &'static str {
        "Scripted"
    }
}

/// Records every delivery attempt; ids listed in `failing` report failure.
#[derive(Default)]
pub struct RecordingDelivery {
    failing: HashSet<String>,
    pub attempts: Mutex<Vec<String>>,
    pub shutdowns: AtomicUsize,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn attempted(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Delivery for RecordingDelivery {
    async fn deliver(&self, article: &Article) -> bool {
        self.attempts.lock().unwrap().push(article.title.clone());
        !self.failing.contains(&article.title)
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
