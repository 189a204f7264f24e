//! Historical summon showcases.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::embed::Embed;
use crate::entity::{Entity, EntityKind};
use crate::row::Row;
use crate::store::EntityStore;
use crate::text::wiki_link;
use crate::unit::{Adventurer, Dragon};

const SHOWCASE_COLOR: u32 = 0x2ECC71;

/// A summon showcase and the units it featured.
#[derive(Debug, Clone, Default)]
pub struct Showcase {
    /// Name; also the table key.
    pub name: String,
    /// Showcase type, e.g. "Gala" or "Regular".
    pub showcase_type: Option<String>,
    /// Start of the showcase.
    pub start_date: Option<DateTime<Utc>>,
    /// End of the showcase.
    pub end_date: Option<DateTime<Utc>>,
    /// Featured adventurers that exist in the store.
    pub featured_adventurers: Vec<Arc<Adventurer>>,
    /// Featured dragons that exist in the store.
    pub featured_dragons: Vec<Arc<Dragon>>,
    /// Featured wyrmprint names.
    pub featured_wyrmprints: Vec<String>,
}

impl Showcase {
    /// Parse a row of the showcases table, resolving featured units by name.
    pub fn from_row(row: &Row<'_>, store: &EntityStore) -> Option<Self> {
        let name = row.raw("Name")?;
        let featured_adventurers = row
            .list("FeaturedAdventurers")
            .into_iter()
            .filter_map(|n| {
                let found = store.adventurer(&n);
                if found.is_none() {
                    warn!(showcase = %name, adventurer = %n, "Featured adventurer not found");
                }
                found
            })
            .collect();
        let featured_dragons = row
            .list("FeaturedDragons")
            .into_iter()
            .filter_map(|n| {
                let found = store.dragon(&n);
                if found.is_none() {
                    warn!(showcase = %name, dragon = %n, "Featured dragon not found");
                }
                found
            })
            .collect();
        Some(Self {
            showcase_type: row.text("Type"),
            start_date: row.date("StartDate"),
            end_date: row.date("EndDate"),
            featured_adventurers,
            featured_dragons,
            featured_wyrmprints: row.list("FeaturedWyrmprints"),
            name,
        })
    }

    /// A showcase with the given name and featured units.
    pub fn new(
        name: impl Into<String>,
        adventurers: Vec<Arc<Adventurer>>,
        dragons: Vec<Arc<Dragon>>,
    ) -> Self {
        Self {
            name: name.into(),
            featured_adventurers: adventurers,
            featured_dragons: dragons,
            ..Self::default()
        }
    }

    /// Whether the showcase features anything that can be summoned.
    pub fn has_featured_units(&self) -> bool {
        !self.featured_adventurers.is_empty() || !self.featured_dragons.is_empty()
    }
}

impl Entity for Showcase {
    fn key(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Showcase
    }

    fn render(&self) -> Embed {
        let adventurers = self
            .featured_adventurers
            .iter()
            .map(|a| a.full_name())
            .collect::<Vec<_>>()
            .join("\n");
        let dragons = self
            .featured_dragons
            .iter()
            .map(|d| d.name.clone())
            .collect::<Vec<_>>()
            .join("\n");
        let dates = match (&self.start_date, &self.end_date) {
            (Some(s), Some(e)) => format!("{} to {}", s.date_naive(), e.date_naive()),
            (Some(s), None) => format!("From {}", s.date_naive()),
            _ => String::new(),
        };
        let mut embed = Embed::new()
            .title(&self.name)
            .url(wiki_link(&self.name))
            .color(SHOWCASE_COLOR)
            .description(self.showcase_type.clone().unwrap_or_default())
            .field("Featured Adventurers", adventurers, true)
            .field("Featured Dragons", dragons, true)
            .field("Featured Wyrmprints", self.featured_wyrmprints.join("\n"), true);
        if !dates.is_empty() {
            embed = embed.footer(dates);
        }
        embed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Availability;
    use serde_json::{Value, json};

    #[test]
    fn resolves_known_units_only() {
        let mut store = EntityStore::default();
        store.insert_adventurer(Adventurer::new("Gala Leonidas", 5, Availability::Gala));
        let f = match json!({
            "Name": "Gala Dragalia (Gala Leonidas)",
            "Type": "Gala",
            "StartDate": "2020-03-01 06:00:00",
            "FeaturedAdventurers": "Gala Leonidas, Somebody Else",
            "FeaturedDragons": ""
        }) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let sc = Showcase::from_row(&Row::new("showcases", &f), &store).unwrap();
        assert_eq!(sc.featured_adventurers.len(), 1);
        assert!(sc.featured_dragons.is_empty());
        assert!(sc.has_featured_units());
        assert_eq!(sc.render().footer.as_deref(), Some("From 2020-03-01"));
    }

    #[test]
    fn empty_showcase_has_no_units() {
        assert!(!Showcase::new("none", Vec::new(), Vec::new()).has_featured_units());
    }
}
