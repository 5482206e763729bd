// src/deliver/caption.rs
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::news::Article;

/// Telegram caption in HTML parse mode:
///
/// ```text
/// 📰 <b>{source}: {title}</b>
///
/// <i>{description}</i>
///
/// 🔗 <a href="{url}">{read_more}</a>
/// ```
pub fn render_caption(article: &Article, read_more: &str) -> String {
    format!(
        "📰 <b>{source}: {title}</b>\n\n<i>{description}</i>\n\n🔗 <a href=\"{url}\">{read_more}</a>",
        source = encode_text(&article.source.name),
        title = encode_text(&article.title),
        description = encode_text(&article.description),
        url = encode_double_quoted_attribute(&article.url),
        read_more = encode_text(read_more),
    )
}
