// src/deliver/mod.rs
pub mod caption;
pub mod telegram;

use async_trait::async_trait;

use crate::news::Article;

pub use caption::render_caption;
pub use telegram::TelegramDelivery;

/// Outbound channel for fetched articles.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Send one article. Failures are logged by the implementation and reported as `false`.
    async fn deliver(&self, article: &Article) -> bool;

    /// Close the underlying session. Safe to call more than once; later calls are no-ops.
    async fn shutdown(&self);
}
