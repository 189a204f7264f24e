//! Answering `[[term]]` queries embedded in chat messages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use notte_core::text::readable_list;
use notte_core::{Embed, Message};

use crate::index::{FuzzyIndex, threshold};
use crate::payload::QueryPayload;

static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.+?)\]\]").unwrap());
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://\S+$").unwrap());

/// Most queries answered per message.
pub const MAX_QUERIES: usize = 3;

/// Sent when a message holds more than [`MAX_QUERIES`] queries.
pub const TOO_MANY_QUERIES: &str = "Too many queries, only the first three will be shown.";

/// Sent for a query longer than anything in the index could match.
pub const QUERY_TOO_LONG: &str = "That's way too long, I'm not looking for that!";

/// A hand-written answer that takes precedence over the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialQuery {
    /// Card title.
    pub title: String,
    /// Card text, or an image URL.
    pub content: String,
}

impl SpecialQuery {
    fn render(&self) -> Embed {
        let card = Embed::new().title(&self.title);
        if URL_RE.is_match(self.content.trim()) {
            card.image(self.content.trim())
        } else {
            card.description(&self.content)
        }
    }
}

/// Every `[[term]]` in `message`, lowercased, in order of appearance.
pub fn extract_queries(message: &str) -> Vec<String> {
    if !message.contains("[[") {
        return Vec::new();
    }
    let lowered = message.to_lowercase();
    QUERY_RE
        .captures_iter(&lowered)
        .map(|c| c[1].to_string())
        .collect()
}

/// Replies to every query in `message`, in order. Messages without queries
/// get no replies. Special queries match at any length; other terms are
/// refused once they are too long for the index.
pub fn answer_queries(
    index: &FuzzyIndex<QueryPayload>,
    special: &BTreeMap<String, SpecialQuery>,
    message: &str,
) -> Vec<Message> {
    let queries = extract_queries(message);
    let mut replies = Vec::new();
    if queries.len() > MAX_QUERIES {
        replies.push(Message::text(TOO_MANY_QUERIES));
    }
    for term in queries.into_iter().take(MAX_QUERIES) {
        if let Some(sq) = special.get(&term) {
            replies.push(Message::embed(sq.render()));
            continue;
        }
        if index.is_too_long(&term) {
            replies.push(Message::text(QUERY_TOO_LONG));
            continue;
        }
        match index.resolve(&term) {
            Some(found) => {
                debug!(query = %term, key = %found.key, confidence = found.confidence, "Resolved query");
                replies.push(Message::embed(found.payload.render()));
            }
            None => replies.push(Message::text(format!("I'm not sure what \"{term}\" is."))),
        }
    }
    replies
}

/// Every candidate key for `text` with its confidence, as a readable list.
pub fn describe_matches(index: &FuzzyIndex<QueryPayload>, text: &str) -> String {
    let limit = threshold(&text.to_lowercase());
    let entries: Vec<String> = index
        .matches(text)
        .into_iter()
        .map(|m| {
            let percent = (100.0 * (1.0 - m.distance as f64 / limit)) as i64;
            format!("\"{}\" ({percent}%)", m.key)
        })
        .collect();
    if entries.is_empty() {
        "No results found.".to_string()
    } else {
        readable_list(&entries, "and")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notte_core::{EntityRef, Skill};
    use std::sync::Arc;

    fn index() -> FuzzyIndex<QueryPayload> {
        let mut index = FuzzyIndex::new();
        for name in ["dark fervor", "sunlit smite"] {
            index
                .add(name, EntityRef::Skill(Arc::new(Skill::named(name))).into())
                .unwrap();
        }
        index
    }

    fn special() -> BTreeMap<String, SpecialQuery> {
        BTreeMap::from([
            (
                "notte".to_string(),
                SpecialQuery {
                    title: "Notte".to_string(),
                    content: "That's me!".to_string(),
                },
            ),
            (
                "dance".to_string(),
                SpecialQuery {
                    title: "Dance".to_string(),
                    content: "https://example.com/dance.gif".to_string(),
                },
            ),
        ])
    }

    #[test]
    fn extracts_lowercase_terms() {
        assert_eq!(
            extract_queries("Look at [[Dark Fervor]] and [[SS]]!"),
            vec!["dark fervor", "ss"]
        );
        assert!(extract_queries("no queries [here]").is_empty());
        assert!(extract_queries("[[]]").is_empty());
    }

    #[test]
    fn resolves_and_reports_misses() {
        let replies = answer_queries(&index(), &BTreeMap::new(), "[[dark fervr]] [[zzzz]]");
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].embeds[0].title.as_deref(), Some("dark fervor"));
        assert_eq!(
            replies[1].content.as_deref(),
            Some("I'm not sure what \"zzzz\" is.")
        );
    }

    #[test]
    fn caps_query_count() {
        let replies = answer_queries(
            &index(),
            &BTreeMap::new(),
            "[[dark fervor]] [[dark fervor]] [[dark fervor]] [[dark fervor]]",
        );
        assert_eq!(replies.len(), 4);
        assert_eq!(replies[0].content.as_deref(), Some(TOO_MANY_QUERIES));
    }

    #[test]
    fn rejects_overlong_terms() {
        // Longest key is 12 characters; 18 exceeds it by more than five.
        let replies = answer_queries(&index(), &BTreeMap::new(), &format!("[[{}]]", "a".repeat(18)));
        assert_eq!(replies[0].content.as_deref(), Some(QUERY_TOO_LONG));
    }

    #[test]
    fn special_queries_take_precedence() {
        let replies = answer_queries(&index(), &special(), "[[Notte]] [[dance]]");
        assert_eq!(replies[0].embeds[0].description.as_deref(), Some("That's me!"));
        assert_eq!(
            replies[1].embeds[0].image.as_deref(),
            Some("https://example.com/dance.gif")
        );
    }

    #[test]
    fn long_special_query_is_answered() {
        let mut special = special();
        special.insert(
            "best girl notte".to_string(),
            SpecialQuery {
                title: "Best Girl".to_string(),
                content: "Obviously.".to_string(),
            },
        );
        let mut short: FuzzyIndex<QueryPayload> = FuzzyIndex::new();
        short
            .add("ssb", EntityRef::Skill(Arc::new(Skill::named("ssb"))).into())
            .unwrap();

        let replies = answer_queries(&short, &special, "[[Best Girl Notte]] [[best girl mym]]");
        assert_eq!(replies[0].embeds[0].title.as_deref(), Some("Best Girl"));
        assert_eq!(replies[1].content.as_deref(), Some(QUERY_TOO_LONG));
    }

    #[test]
    fn describe_lists_confidences() {
        assert_eq!(
            describe_matches(&index(), "dark fervor"),
            "\"dark fervor\" (100%)"
        );
        assert_eq!(describe_matches(&index(), "qqqqqqq"), "No results found.");
    }
}
