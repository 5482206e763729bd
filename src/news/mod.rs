// src/news/mod.rs
pub mod gnews;
pub mod types;

pub use gnews::{parse_news, GNewsClient};
pub use types::{Article, NewsResult, NewsSource, Source};
