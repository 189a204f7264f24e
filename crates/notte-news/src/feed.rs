//! The news feed capability and its wire types.
//!
//! Article lists are paged by priority: each page holds articles in
//! descending priority, and carries the cursor for the next page.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::NewsResult;

/// Cursor for the first page of the article list.
pub const FIRST_PAGE_CURSOR: i64 = 1_000_000_000;

/// Result code of a successful API call.
pub const RESULT_OK: i64 = 1;

/// One entry of the article list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    /// Unique article id.
    pub article_id: u64,
    /// Headline.
    pub title_name: String,
    /// Category label, e.g. "Event" or "Maintenance".
    #[serde(default)]
    pub category_name: String,
    /// Ordering key; higher is newer.
    pub priority: i64,
    /// Publication time, in seconds since the Unix epoch.
    pub date: i64,
}

/// One page of the article list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPage {
    /// Articles on this page, highest priority first.
    #[serde(default)]
    pub contents: Vec<ArticleSummary>,
    /// Cursor for the following page.
    #[serde(default, deserialize_with = "lenient_int")]
    pub priority_lower_than: i64,
}

/// The newest article already posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    /// Id of the last posted article.
    pub article_id: u64,
    /// Publication time of the last posted article.
    pub date: i64,
}

impl From<&ArticleSummary> for Watermark {
    fn from(article: &ArticleSummary) -> Self {
        Self {
            article_id: article.article_id,
            date: article.date,
        }
    }
}

/// Source of news articles.
#[async_trait]
pub trait NewsFeed: Send + Sync {
    /// The page of articles whose priority is below `priority_lower_than`.
    async fn list(&self, priority_lower_than: i64) -> NewsResult<NewsPage>;

    /// The HTML body of one article.
    async fn detail(&self, article_id: u64) -> NewsResult<String>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataHeaders {
    pub result_code: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data_headers: DataHeaders,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListData {
    pub category: NewsPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailData {
    pub information: ArticleInformation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArticleInformation {
    #[serde(default)]
    pub message: String,
}

/// Integers sometimes arrive as strings or floats; anything unreadable is 0.
fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_cursor_accepts_strings_and_numbers() {
        let page: NewsPage =
            serde_json::from_str(r#"{"contents": [], "priority_lower_than": "1203"}"#).unwrap();
        assert_eq!(page.priority_lower_than, 1203);
        let page: NewsPage = serde_json::from_str(r#"{"priority_lower_than": 77}"#).unwrap();
        assert_eq!(page.priority_lower_than, 77);
        let page: NewsPage = serde_json::from_str(r#"{"priority_lower_than": "soon"}"#).unwrap();
        assert_eq!(page.priority_lower_than, 0);
    }

    #[test]
    fn envelope_without_data() {
        let env: Envelope<ListData> =
            serde_json::from_str(r#"{"data_headers": {"result_code": 0}}"#).unwrap();
        assert_eq!(env.data_headers.result_code, 0);
        assert!(env.data.is_none());
    }
}
