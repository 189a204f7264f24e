//! Notte: a game-info assistant for chat, run on the console.

mod bot;
mod config;
mod console;
mod error;
mod logging;
mod sink;
mod state;
mod timers;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use notte_news::HttpNewsFeed;

use crate::bot::Bot;
use crate::config::BotConfig;
use crate::error::BotResult;
use crate::sink::{ConsoleSink, NotificationSink};
use crate::state::JsonConfigStore;

#[derive(Parser)]
#[command(
    name = "notte",
    about = "Notte: game-info lookups, summon simulation, and news for chat",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: built-in defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory with the entity JSON tables (overrides the config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Treat each stdin line as a chat message and print the replies
    Run {
        /// Do not poll for news
        #[arg(long)]
        no_news: bool,
    },

    /// Handle one message and exit
    Ask {
        /// Message text, e.g. "[[gala leonidas]]" or "!single"
        message: String,
    },

    /// Load the data and report what was indexed
    Check,

    /// Check the news feed once and print new articles
    News,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> BotResult<()> {
    let mut config = BotConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    logging::init(&config.log_level);

    match cli.command {
        Commands::Run { no_news } => {
            let bot = Arc::new(Bot::load(config)?);
            println!("  {} Notte on the console", "Started".bold());
            println!("  {} queries loaded. End input to quit.\n", bot.query_count());
            runtime()?.block_on(console::run(bot, Arc::new(ConsoleSink), !no_news))
        }
        Commands::Ask { message } => {
            let bot = Bot::load(config)?;
            let incoming = bot.console_message(&message);
            for reply in bot.handle(&incoming) {
                ConsoleSink.send(&reply)?;
            }
            Ok(())
        }
        Commands::Check => {
            let bot = Bot::load(config)?;
            println!(
                "  {} {} queries from {}",
                "Indexed".bold(),
                bot.query_count(),
                bot.config().data_dir.display()
            );
            Ok(())
        }
        Commands::News => {
            let feed = HttpNewsFeed::new(&config.news.base_url, &config.news.language);
            let state = JsonConfigStore::open(&config.state_file)?;
            let posted = runtime()?.block_on(timers::post_news(&feed, &state, &ConsoleSink))?;
            println!("  {} new article{}", posted, if posted == 1 { "" } else { "s" });
            Ok(())
        }
    }
}

fn runtime() -> BotResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Into::into)
}
