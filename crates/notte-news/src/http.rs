//! [`NewsFeed`] over the game site's JSON API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{NewsError, NewsResult};
use crate::feed::{DetailData, Envelope, ListData, NewsFeed, NewsPage, RESULT_OK};

/// Public site of the game.
pub const DEFAULT_BASE_URL: &str = "https://dragalialost.com";
/// Language of the fetched articles.
pub const DEFAULT_LANGUAGE: &str = "en_us";

const API_PATH: &str = "/api/index.php";

/// Fetches articles from `{base_url}/api/index.php`.
#[derive(Debug, Clone)]
pub struct HttpNewsFeed {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl HttpNewsFeed {
    /// A feed for the given site and language.
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
        }
    }

    /// Site root this feed reads from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn query<T: DeserializeOwned>(&self, action: &str, param: (&str, String)) -> NewsResult<T> {
        let url = format!("{}{API_PATH}", self.base_url);
        debug!(%url, action, "Requesting news");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("type", "information"),
                ("action", action),
                ("lang", self.language.as_str()),
            ])
            .query(&[param])
            .send()
            .await?
            .error_for_status()?;

        // The API does not always label its JSON as such.
        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        let code = envelope.data_headers.result_code;
        if code != RESULT_OK {
            error!(action, code, "News API rejected the query");
            return Err(NewsError::ResultCode { code });
        }
        envelope.data.ok_or(NewsError::MissingData)
    }
}

impl Default for HttpNewsFeed {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_LANGUAGE)
    }
}

#[async_trait]
impl NewsFeed for HttpNewsFeed {
    async fn list(&self, priority_lower_than: i64) -> NewsResult<NewsPage> {
        let data: ListData = self
            .query(
                "information_list",
                ("priority_lower_than", priority_lower_than.to_string()),
            )
            .await?;
        Ok(data.category)
    }

    async fn detail(&self, article_id: u64) -> NewsResult<String> {
        let data: DetailData = self
            .query("information_detail", ("article_id", article_id.to_string()))
            .await?;
        Ok(data.information.message)
    }
}
