//! Bot configuration, read from `notte.toml`.
//!
//! Every key is optional; a missing file path means all defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use notte_news::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};
use notte_query::SpecialQuery;

use crate::error::{BotError, BotResult};

/// News polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    /// Whether `run` polls for news.
    pub enabled: bool,
    /// Site root of the news API.
    pub base_url: String,
    /// Article language.
    pub language: String,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Who is talking when messages come from the console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleActor {
    /// Channel id reported for console messages.
    pub channel_id: u64,
    /// User id reported for console messages; the owner when unset.
    pub user_id: Option<u64>,
    /// Whether the console user holds the host's manage permission.
    pub admin: bool,
}

/// Everything `notte.toml` can set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Command prefix, e.g. `!`.
    pub prefix: String,
    /// User id allowed to run owner commands.
    pub owner_id: u64,
    /// Directory with the entity JSON tables.
    pub data_dir: PathBuf,
    /// JSON file holding persistent bot state.
    pub state_file: PathBuf,
    /// Summon seed; random when unset.
    pub seed: Option<u64>,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Daily data refresh time (`HH:MM`, UTC); no refresh when unset.
    pub refresh_time: Option<String>,
    /// Console identity.
    pub console: ConsoleActor,
    /// News polling.
    pub news: NewsSettings,
    /// Extra query names per entity category: alias → canonical name.
    pub aliases: BTreeMap<String, BTreeMap<String, String>>,
    /// Descriptions shown above ability disambiguation lists, by generic
    /// ability name.
    pub ability_disambiguation: BTreeMap<String, String>,
    /// Fixed answers that take precedence over the query index.
    pub special_queries: BTreeMap<String, SpecialQuery>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            owner_id: 0,
            data_dir: PathBuf::from("data"),
            state_file: PathBuf::from("notte-state.json"),
            seed: None,
            log_level: "info".to_string(),
            refresh_time: None,
            console: ConsoleActor::default(),
            news: NewsSettings::default(),
            aliases: BTreeMap::new(),
            ability_disambiguation: BTreeMap::new(),
            special_queries: BTreeMap::new(),
        }
    }
}

impl BotConfig {
    /// Read and validate a config file, or use defaults when `path` is
    /// `None`.
    pub fn load(path: Option<&Path>) -> BotResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| BotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| BotError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalized()
    }

    fn normalized(mut self) -> BotResult<Self> {
        if self.prefix.trim().is_empty() {
            return Err(BotError::ConfigValue {
                key: "prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        self.refresh_time()?;
        self.special_queries = self
            .special_queries
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Ok(self)
    }

    /// The parsed daily refresh time.
    pub fn refresh_time(&self) -> BotResult<Option<NaiveTime>> {
        self.refresh_time
            .as_deref()
            .map(|t| {
                NaiveTime::parse_from_str(t.trim(), "%H:%M").map_err(|e| BotError::ConfigValue {
                    key: "refresh_time".to_string(),
                    reason: format!("\"{t}\" is not HH:MM ({e})"),
                })
            })
            .transpose()
    }

    /// User id of console messages.
    pub fn console_user(&self) -> u64 {
        self.console.user_id.unwrap_or(self.owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> BotResult<BotConfig> {
        let config: BotConfig = toml::from_str(text).unwrap();
        config.normalized()
    }

    #[test]
    fn defaults_without_file() {
        let config = BotConfig::load(None).unwrap();
        assert_eq!(config.prefix, "!");
        assert!(config.news.enabled);
        assert_eq!(config.refresh_time().unwrap(), None);
    }

    #[test]
    fn full_config() {
        let config = parse(
            r#"
prefix = "?"
owner_id = 99
seed = 7
refresh_time = "04:30"

[console]
channel_id = 5

[news]
enabled = false

[aliases.adventurer]
leo = "gala leonidas"

[ability_disambiguation]
"strength" = "Increases strength."

[special_queries."Best Girl"]
title = "Best Girl"
content = "Notte, obviously."
"#,
        )
        .unwrap();
        assert_eq!(config.prefix, "?");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.console_user(), 99);
        assert!(!config.news.enabled);
        assert_eq!(config.news.language, "en_us");
        assert_eq!(config.aliases["adventurer"]["leo"], "gala leonidas");
        assert!(config.special_queries.contains_key("best girl"));
        assert_eq!(
            config.refresh_time().unwrap(),
            NaiveTime::from_hms_opt(4, 30, 0)
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse("prefix = \"  \""),
            Err(BotError::ConfigValue { .. })
        ));
        assert!(matches!(
            parse("refresh_time = \"late\""),
            Err(BotError::ConfigValue { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = BotConfig::load(Some(Path::new("/nonexistent/notte.toml"))).unwrap_err();
        assert!(matches!(err, BotError::Io { .. }));
    }
}
