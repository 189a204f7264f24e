//! Background jobs: news polling and the daily data refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use tracing::{error, info, warn};

use notte_core::Message;
use notte_news::schedule::{checks_at_startup, delay_until_next, initial_delay};
use notte_news::{NewsFeed, check_news};

use crate::bot::Bot;
use crate::error::BotResult;
use crate::sink::NotificationSink;
use crate::state::{ConfigStore, load_watermark, save_watermark};

/// Check the feed once, store the new watermark, and post new articles.
/// Returns the number of articles posted.
pub async fn post_news(
    feed: &dyn NewsFeed,
    state: &dyn ConfigStore,
    sink: &dyn NotificationSink,
) -> BotResult<usize> {
    let outcome = check_news(feed, load_watermark(state)).await?;
    if let Some(watermark) = outcome.watermark {
        save_watermark(state, watermark)?;
    }
    let mut posted = 0;
    for embed in outcome.posts {
        match sink.send(&Message::embed(embed)) {
            Ok(()) => posted += 1,
            Err(e) => error!(error = %e, "Could not post news article"),
        }
    }
    Ok(posted)
}

async fn news_tick(feed: &dyn NewsFeed, state: &dyn ConfigStore, sink: &dyn NotificationSink) {
    match post_news(feed, state, sink).await {
        Ok(0) => {}
        Ok(posted) => info!(posted, "Posted news"),
        Err(e) => error!(error = %e, "News check failed"),
    }
}

/// Poll for news forever on the five-minute schedule.
pub async fn run_news(
    feed: Arc<dyn NewsFeed>,
    state: Arc<dyn ConfigStore>,
    sink: Arc<dyn NotificationSink>,
) {
    let now = Utc::now();
    let first = initial_delay(now);
    if checks_at_startup(now) {
        news_tick(feed.as_ref(), state.as_ref(), sink.as_ref()).await;
    }
    tokio::time::sleep(first).await;
    loop {
        let started = Utc::now();
        news_tick(feed.as_ref(), state.as_ref(), sink.as_ref()).await;
        tokio::time::sleep(delay_until_next(started)).await;
    }
}

/// Time from `now` until the next `at` (UTC).
pub fn delay_until_daily(now: DateTime<Utc>, at: NaiveTime) -> Duration {
    let today = now.date_naive().and_time(at).and_utc();
    let next = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Reload entity data every day at `at` (UTC).
pub async fn run_daily_refresh(bot: Arc<Bot>, at: NaiveTime) {
    loop {
        let delay = delay_until_daily(Utc::now(), at);
        info!(in_seconds = delay.as_secs(), "Next data refresh scheduled");
        tokio::time::sleep(delay).await;
        let worker = Arc::clone(&bot);
        match tokio::task::spawn_blocking(move || worker.reload()).await {
            Ok(Ok(queries)) => info!(queries, "Daily data refresh done"),
            Ok(Err(e)) => warn!(error = %e, "Daily data refresh failed, keeping current data"),
            Err(e) => error!(error = %e, "Daily data refresh task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use serde_json::Value;

    use notte_news::{ArticleSummary, FIRST_PAGE_CURSOR, NewsError, NewsPage, NewsResult, Watermark};

    use super::*;
    use crate::sink::MemorySink;

    #[derive(Default)]
    struct MemoryState {
        values: Mutex<BTreeMap<String, Value>>,
    }

    impl ConfigStore for MemoryState {
        fn get(&self, key: &str) -> Option<Value> {
            self.values.lock().get(key).cloned()
        }

        fn set(&self, key: &str, value: Value) -> BotResult<()> {
            self.values.lock().insert(key.to_string(), value);
            Ok(())
        }
    }

    struct OnePageFeed(Vec<ArticleSummary>);

    #[async_trait]
    impl NewsFeed for OnePageFeed {
        async fn list(&self, priority_lower_than: i64) -> NewsResult<NewsPage> {
            if priority_lower_than == FIRST_PAGE_CURSOR {
                Ok(NewsPage {
                    contents: self.0.clone(),
                    priority_lower_than: 1,
                })
            } else {
                Ok(NewsPage::default())
            }
        }

        async fn detail(&self, _article_id: u64) -> NewsResult<String> {
            Err(NewsError::MissingData)
        }
    }

    fn article(id: u64, priority: i64) -> ArticleSummary {
        ArticleSummary {
            article_id: id,
            title_name: format!("News {id}"),
            category_name: "Update".to_string(),
            priority,
            date: 1_000 + priority,
        }
    }

    #[tokio::test]
    async fn first_run_stores_watermark_then_posts_new_articles() {
        let state = MemoryState::default();
        let sink = MemorySink::default();

        let feed = OnePageFeed(vec![article(2, 20), article(1, 10)]);
        assert_eq!(post_news(&feed, &state, &sink).await.unwrap(), 0);
        assert_eq!(
            load_watermark(&state),
            Some(Watermark {
                article_id: 2,
                date: 1_020
            })
        );

        let feed = OnePageFeed(vec![article(4, 40), article(3, 30), article(2, 20)]);
        assert_eq!(post_news(&feed, &state, &sink).await.unwrap(), 2);
        let sent = sink.sent.lock();
        assert_eq!(sent[0].embeds[0].title.as_deref(), Some("News 3"));
        assert_eq!(sent[1].embeds[0].title.as_deref(), Some("News 4"));
        assert_eq!(load_watermark(&state).map(|w| w.article_id), Some(4));
    }

    #[test]
    fn daily_delay_rolls_over_midnight() {
        let at = NaiveTime::from_hms_opt(4, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2020, 1, 1, 3, 0, 0).unwrap();
        assert_eq!(delay_until_daily(before, at), Duration::from_secs(3600));
        let after = Utc.with_ymd_and_hms(2020, 1, 1, 4, 0, 0).unwrap();
        assert_eq!(delay_until_daily(after, at), Duration::from_secs(24 * 3600));
    }
}
