//! One news check: find articles newer than the watermark and build their
//! embeds.
//!
//! Persisting the returned watermark is left to the caller. The bot saves it
//! before posting, so an article whose post fails is not sent again.

use chrono::DateTime;
use tracing::{error, info, warn};

use notte_core::Embed;

use crate::error::NewsResult;
use crate::feed::{ArticleSummary, FIRST_PAGE_CURSOR, NewsFeed, Watermark};
use crate::strip::article_preview;

/// Where posted articles link to.
pub const ARTICLE_URL_BASE: &str = "https://dragalialost.com/en/news/detail/";
/// Accent color of news embeds.
pub const NEWS_COLOR: u32 = 0x00A0FF;

const POSTED_FORMAT: &str = "%B %d, %I:%M %p (UTC)";

/// Outcome of a news check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    /// Embeds to post, oldest article first.
    pub posts: Vec<Embed>,
    /// Watermark to store, when it changed.
    pub watermark: Option<Watermark>,
}

/// Articles newer than `watermark`, in the order they were published.
///
/// Pages are read until the watermark article or an older article shows
/// up, a page comes back empty, or the cursor stops moving.
pub async fn collect_new_articles(
    feed: &dyn NewsFeed,
    watermark: Watermark,
) -> NewsResult<Vec<ArticleSummary>> {
    let mut cursor = FIRST_PAGE_CURSOR;
    let mut articles = Vec::new();
    'pages: loop {
        let page = feed.list(cursor).await?;
        if page.contents.is_empty() {
            break;
        }
        for article in page.contents {
            if article.article_id == watermark.article_id || article.date < watermark.date {
                break 'pages;
            }
            articles.push(article);
        }
        if page.priority_lower_than <= 0 || page.priority_lower_than >= cursor {
            warn!(cursor, next = page.priority_lower_than, "News cursor did not advance");
            break;
        }
        cursor = page.priority_lower_than;
    }
    articles.sort_by_key(|a| a.priority);
    Ok(articles)
}

/// Check the feed once.
///
/// Without a watermark the newest article becomes the watermark and
/// nothing is posted.
pub async fn check_news(feed: &dyn NewsFeed, watermark: Option<Watermark>) -> NewsResult<PollOutcome> {
    let Some(watermark) = watermark else {
        let page = feed.list(FIRST_PAGE_CURSOR).await?;
        let Some(newest) = page.contents.first() else {
            warn!("News feed is empty; no watermark set");
            return Ok(PollOutcome::default());
        };
        warn!(
            article_id = newest.article_id,
            date = newest.date,
            "Setting news watermark to the most recent article"
        );
        return Ok(PollOutcome {
            posts: Vec::new(),
            watermark: Some(Watermark::from(newest)),
        });
    };

    let articles = collect_new_articles(feed, watermark).await?;
    let mut posts = Vec::with_capacity(articles.len());
    for article in &articles {
        info!(article_id = article.article_id, "Retrieving news content");
        let body = match feed.detail(article.article_id).await {
            Ok(html) => Some(article_preview(&article.title_name, &html)),
            Err(e) => {
                error!(article_id = article.article_id, error = %e, "Could not retrieve news content");
                None
            }
        };
        info!(
            article_id = article.article_id,
            date = article.date,
            "Posting news article"
        );
        posts.push(article_embed(article, body.as_deref()));
    }

    Ok(PollOutcome {
        posts,
        watermark: articles.last().map(Watermark::from),
    })
}

/// The embed announcing `article`, with an optional body preview.
pub fn article_embed(article: &ArticleSummary, body: Option<&str>) -> Embed {
    let mut embed = Embed::new()
        .title(&article.title_name)
        .url(format!("{ARTICLE_URL_BASE}{}", article.article_id))
        .color(NEWS_COLOR)
        .author(format!("{} | Dragalia Lost News", article.category_name));
    if let Some(body) = body {
        embed = embed.description(body);
    }
    if let Some(posted) = DateTime::from_timestamp(article.date, 0) {
        embed = embed.footer(format!("Posted {}", posted.format(POSTED_FORMAT)));
    }
    embed
}
