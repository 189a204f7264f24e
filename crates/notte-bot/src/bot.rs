//! Message handling: prefixed commands with permission levels, and
//! `[[term]]` queries in everything else.

use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, info};

use notte_core::{EntityStore, Message};
use notte_query::{QueryPayload, Resolver, answer_queries, build_index, describe_matches};
use notte_summon::{ActorKey, SummonService};

use crate::config::BotConfig;
use crate::error::BotResult;

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Permission {
    /// Anyone.
    Public,
    /// Users the host reports as channel managers.
    Admin,
    /// The configured owner.
    Owner,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Admin => write!(f, "admin"),
            Self::Owner => write!(f, "owner"),
        }
    }
}

/// A message received from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    /// Channel the message was posted in.
    pub channel_id: u64,
    /// Author of the message.
    pub user_id: u64,
    /// Whether the host grants the author its manage permission.
    pub is_admin: bool,
    /// Raw text.
    pub content: String,
}

struct CommandSpec {
    name: &'static str,
    permission: Permission,
    usage: &'static str,
    summary: &'static str,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "single",
        permission: Permission::Public,
        usage: "single",
        summary: "Summon once on your current showcase.",
    },
    CommandSpec {
        name: "tenfold",
        permission: Permission::Public,
        usage: "tenfold",
        summary: "Summon ten times; the last pull is at least 4★.",
    },
    CommandSpec {
        name: "showcase",
        permission: Permission::Public,
        usage: "showcase [list | info [name] | none | <name>]",
        summary: "Show or change the showcase you summon on.",
    },
    CommandSpec {
        name: "help",
        permission: Permission::Public,
        usage: "help",
        summary: "List the commands you can use.",
    },
    CommandSpec {
        name: "query_results",
        permission: Permission::Owner,
        usage: "query_results <text>",
        summary: "Show every query matching the text, with confidence.",
    },
    CommandSpec {
        name: "reload",
        permission: Permission::Owner,
        usage: "reload",
        summary: "Reload entity data and rebuild the query index.",
    },
];

/// The bot: configuration, the live query index, and the summon service.
pub struct Bot {
    config: BotConfig,
    resolver: Resolver<QueryPayload>,
    summon: SummonService,
    refreshing: Mutex<()>,
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("prefix", &self.config.prefix)
            .field("queries", &self.resolver.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl Bot {
    /// Load entity data from the configured directory and build the bot.
    pub fn load(config: BotConfig) -> BotResult<Self> {
        let store = EntityStore::load_dir(&config.data_dir)?;
        Self::from_store(config, &store)
    }

    /// Build the bot over already loaded data.
    pub fn from_store(config: BotConfig, store: &EntityStore) -> BotResult<Self> {
        let index = build_index(store, &config.aliases, config.ability_disambiguation.clone())?;
        let summon = match config.seed {
            Some(seed) => SummonService::new(store, seed)?,
            None => SummonService::from_entropy(store)?,
        };
        Ok(Self {
            config,
            resolver: Resolver::new(index),
            summon,
            refreshing: Mutex::new(()),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Number of keys in the live query index.
    pub fn query_count(&self) -> usize {
        self.resolver.snapshot().len()
    }

    /// Reload entity data and swap in a new index and new showcases. The
    /// old data keeps serving if anything fails.
    pub fn reload(&self) -> BotResult<usize> {
        let store = EntityStore::load_dir(&self.config.data_dir)?;
        self.refresh(&store)
    }

    /// Swap in an index and showcases built from `store`. Refreshes run one
    /// at a time so both always come from the same data.
    fn refresh(&self, store: &EntityStore) -> BotResult<usize> {
        let _guard = self.refreshing.lock();
        let queries = self.resolver.rebuild(|| {
            build_index(
                store,
                &self.config.aliases,
                self.config.ability_disambiguation.clone(),
            )
        })?;
        self.summon.reload(store)?;
        info!(queries, "Data reloaded");
        Ok(queries)
    }

    /// Permission level of the author of `message`.
    pub fn permission_of(&self, message: &Incoming) -> Permission {
        if message.user_id == self.config.owner_id {
            Permission::Owner
        } else if message.is_admin {
            Permission::Admin
        } else {
            Permission::Public
        }
    }

    /// Replies to one incoming message. Most messages get none.
    pub fn handle(&self, message: &Incoming) -> Vec<Message> {
        let content = message.content.trim();
        let Some(invocation) = content.strip_prefix(self.config.prefix.as_str()) else {
            return answer_queries(
                &self.resolver.snapshot(),
                &self.config.special_queries,
                content,
            );
        };

        let (name, args) = match invocation.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (invocation, ""),
        };
        let name = name.to_lowercase();
        let Some(entry) = COMMANDS.iter().find(|c| c.name == name) else {
            debug!(command = %name, "Ignoring unknown command");
            return Vec::new();
        };
        let permission = self.permission_of(message);
        if permission < entry.permission {
            info!(
                command = entry.name,
                user = message.user_id,
                required = %entry.permission,
                "Permission denied"
            );
            return Vec::new();
        }

        vec![self.run_command(entry.name, args, message, permission)]
    }

    fn run_command(&self, name: &str, args: &str, message: &Incoming, permission: Permission) -> Message {
        match name {
            "help" => Message::text(self.help(permission)),
            "query_results" if args.is_empty() => {
                Message::text(format!("Usage: {}query_results <text>", self.config.prefix))
            }
            "query_results" => Message::text(describe_matches(&self.resolver.snapshot(), args)),
            "reload" => match self.reload() {
                Ok(queries) => Message::text(format!("Data reloaded, {queries} queries generated.")),
                Err(e) => Message::text(format!("Reload failed: {e}")),
            },
            _ => {
                let actor = ActorKey::new(message.channel_id, message.user_id);
                self.summon
                    .process(actor, name, args)
                    .unwrap_or_else(|e| Message::text(e.user_message()))
            }
        }
    }

    fn help(&self, permission: Permission) -> String {
        let mut lines = vec!["Commands:".to_string()];
        for entry in COMMANDS.iter().filter(|c| c.permission <= permission) {
            lines.push(format!("  {}{} - {}", self.config.prefix, entry.usage, entry.summary));
        }
        lines.push(String::new());
        lines.push("Put a name in [[double brackets]] anywhere to look it up.".to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notte_core::{Adventurer, Availability, Dragon, Showcase};
    use notte_query::SpecialQuery;

    const OWNER: u64 = 1;

    fn store() -> EntityStore {
        let mut store = EntityStore::default();
        for rarity in [3u8, 4, 5] {
            store.insert_adventurer(Adventurer::new(format!("Hero {rarity}"), rarity, Availability::Permanent));
            store.insert_dragon(Dragon::new(format!("Wyrm {rarity}"), rarity, Availability::Permanent));
        }
        store.insert_adventurer(Adventurer::new("Gala Leonidas", 5, Availability::Gala));
        let leo = store.adventurer("Gala Leonidas").unwrap();
        store.insert_showcase(Showcase::new("Gala Dragalia", vec![leo], Vec::new()));
        store
    }

    fn bot() -> Bot {
        let mut config = BotConfig {
            owner_id: OWNER,
            seed: Some(5),
            ..BotConfig::default()
        };
        config.special_queries.insert(
            "notte".to_string(),
            SpecialQuery {
                title: "Notte".to_string(),
                content: "That's me!".to_string(),
            },
        );
        config
            .aliases
            .entry("adventurer".to_string())
            .or_default()
            .insert("leo".to_string(), "gala leonidas".to_string());
        Bot::from_store(config, &store()).unwrap()
    }

    fn from(user_id: u64, content: &str) -> Incoming {
        Incoming {
            channel_id: 10,
            user_id,
            is_admin: false,
            content: content.to_string(),
        }
    }

    fn text(messages: &[Message]) -> String {
        messages.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn queries_in_plain_messages() {
        let bot = bot();
        let replies = bot.handle(&from(2, "who is [[leo]] and [[notte]]?"));
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].embeds[0].title.as_deref(), Some("Gala Leonidas"));
        assert_eq!(replies[1].embeds[0].description.as_deref(), Some("That's me!"));
        assert!(bot.handle(&from(2, "no brackets here")).is_empty());
    }

    #[test]
    fn public_commands() {
        let bot = bot();
        let single = text(&bot.handle(&from(2, "!single")));
        assert!(single.contains("Showcase: none"));
        let showcase = text(&bot.handle(&from(2, "!showcase gala dragalia")));
        assert_eq!(showcase, "Showcase set to Gala Dragalia. Your pity has been reset.");
        let unknown = text(&bot.handle(&from(2, "!showcase xxxxxxxxxxxxxxxxxxxxxxxxxxxxxx")));
        assert!(unknown.starts_with("I don't know that showcase!"));
    }

    #[test]
    fn owner_commands_are_gated() {
        let bot = bot();
        assert!(bot.handle(&from(2, "!query_results leo")).is_empty());
        let mut admin = from(2, "!query_results leo");
        admin.is_admin = true;
        assert_eq!(bot.permission_of(&admin), Permission::Admin);
        assert!(bot.handle(&admin).is_empty());

        let results = text(&bot.handle(&from(OWNER, "!query_results leo")));
        assert!(results.contains("\"leo\" (100%)"));
    }

    #[test]
    fn help_lists_only_permitted_commands() {
        let bot = bot();
        let public = text(&bot.handle(&from(2, "!help")));
        assert!(public.contains("!tenfold"));
        assert!(!public.contains("reload"));
        let owner = text(&bot.handle(&from(OWNER, "!HELP")));
        assert!(owner.contains("!reload"));
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let bot = bot();
        assert!(bot.handle(&from(2, "!dance")).is_empty());
    }

    #[test]
    fn refresh_swaps_data() {
        let bot = bot();
        let before = bot.query_count();
        let queries = bot.refresh(&EntityStore::default()).unwrap();
        assert_eq!(queries, 0);
        assert!(before > 0);
        let reply = text(&bot.handle(&from(2, "[[leo]]")));
        assert_eq!(reply, "I'm not sure what \"leo\" is.");
    }

    #[test]
    fn concurrent_refreshes_keep_index_and_showcases_together() {
        let bot = bot();
        let full = store();
        let empty = EntityStore::default();
        std::thread::scope(|scope| {
            for i in 0..8 {
                let data = if i % 2 == 0 { &full } else { &empty };
                let bot = &bot;
                scope.spawn(move || {
                    for _ in 0..20 {
                        bot.refresh(data).unwrap();
                    }
                });
            }
        });

        let indexed = bot.query_count() > 0;
        let showcase = text(&bot.handle(&from(2, "!showcase gala dragalia")));
        assert_eq!(showcase.starts_with("Showcase set to"), indexed, "{showcase}");
    }
}
