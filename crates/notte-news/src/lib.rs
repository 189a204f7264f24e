//! News polling for Notte.
//!
//! A [`NewsFeed`] pages through published articles; [`check_news`] finds
//! the ones newer than the stored [`Watermark`] and turns each into an
//! embed with a short preview; [`schedule`] says when to check.

pub mod error;
pub mod feed;
pub mod http;
pub mod poll;
pub mod schedule;
pub mod strip;

pub use error::{NewsError, NewsResult};
pub use feed::{ArticleSummary, FIRST_PAGE_CURSOR, NewsFeed, NewsPage, Watermark};
pub use http::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE, HttpNewsFeed};
pub use poll::{PollOutcome, article_embed, check_news, collect_new_articles};
pub use strip::{article_preview, article_text};
