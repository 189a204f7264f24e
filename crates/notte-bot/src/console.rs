//! Console host: every stdin line is a message from the configured actor.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use notte_news::HttpNewsFeed;

use crate::bot::{Bot, Incoming};
use crate::error::BotResult;
use crate::sink::NotificationSink;
use crate::state::JsonConfigStore;
use crate::timers;

impl Bot {
    /// A console line as an incoming message.
    pub fn console_message(&self, line: &str) -> Incoming {
        let config = self.config();
        Incoming {
            channel_id: config.console.channel_id,
            user_id: config.console_user(),
            is_admin: config.console.admin,
            content: line.to_string(),
        }
    }
}

/// Handle stdin lines until end of input, with the background timers
/// running alongside.
pub async fn run(bot: Arc<Bot>, sink: Arc<dyn NotificationSink>, news: bool) -> BotResult<()> {
    let config = bot.config().clone();
    let mut tasks = Vec::new();

    if news && config.news.enabled {
        let feed = Arc::new(HttpNewsFeed::new(&config.news.base_url, &config.news.language));
        let state = Arc::new(JsonConfigStore::open(&config.state_file)?);
        info!(feed = feed.base_url(), "News polling enabled");
        tasks.push(tokio::spawn(timers::run_news(feed, state, Arc::clone(&sink))));
    }
    if let Some(at) = config.refresh_time()? {
        tasks.push(tokio::spawn(timers::run_daily_refresh(Arc::clone(&bot), at)));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message = bot.console_message(line);
        let worker = Arc::clone(&bot);
        let replies = tokio::task::spawn_blocking(move || worker.handle(&message)).await?;
        debug!(replies = replies.len(), "Handled console message");
        for reply in &replies {
            sink.send(reply)?;
        }
    }

    for task in tasks {
        task.abort();
    }
    info!("Console closed");
    Ok(())
}
