//! Summonable units: adventurers and dragons.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::embed::Embed;
use crate::entity::{
    Availability, Element, Entity, EntityKind, WeaponType, highest_ability_names, origin_footer,
    summary_line,
};
use crate::feature::{Ability, Skill, describe_highest};
use crate::row::Row;
use crate::store::EntityStore;
use crate::text::wiki_link;

const NEUTRAL_COLOR: u32 = 0x888888;

fn rarity_of(row: &Row<'_>) -> Option<u8> {
    row.int("Rarity").and_then(|r| u8::try_from(r).ok())
}

fn stats_line(hp: Option<i64>, str_: Option<i64>) -> String {
    match (hp, str_) {
        (Some(hp), Some(s)) => format!("HP {hp} / Str {s}"),
        (Some(hp), None) => format!("HP {hp}"),
        (None, Some(s)) => format!("Str {s}"),
        (None, None) => String::new(),
    }
}

/// A playable adventurer.
#[derive(Debug, Clone)]
pub struct Adventurer {
    /// Name; also the table key.
    pub name: String,
    /// Epithet, e.g. "Sword of Justice".
    pub title: Option<String>,
    /// Rarity (3-5).
    pub rarity: Option<u8>,
    /// Element.
    pub element: Option<Element>,
    /// Weapon type.
    pub weapon_type: Option<WeaponType>,
    /// Summon availability.
    pub availability: Availability,
    /// Max HP.
    pub max_hp: Option<i64>,
    /// Max strength.
    pub max_str: Option<i64>,
    /// First skill.
    pub skill_1: Option<Arc<Skill>>,
    /// Second skill.
    pub skill_2: Option<Arc<Skill>>,
    /// First ability slot, lowest to highest tier.
    pub ability_1: Vec<Arc<Ability>>,
    /// Second ability slot.
    pub ability_2: Vec<Arc<Ability>>,
    /// Third ability slot.
    pub ability_3: Vec<Arc<Ability>>,
    /// Co-ability tiers.
    pub coability: Vec<Arc<Ability>>,
    /// Chain co-ability tiers.
    pub chain_coability: Vec<Arc<Ability>>,
    /// Where the adventurer comes from.
    pub obtained: Option<String>,
    /// Release date.
    pub release_date: Option<DateTime<Utc>>,
}

impl Adventurer {
    /// Parse a row of the adventurers table, linking skills and abilities
    /// already present in `store`.
    pub fn from_row(row: &Row<'_>, store: &EntityStore) -> Option<Self> {
        let name = row.raw("Name")?;
        Some(Self {
            name,
            title: row.text("Title"),
            rarity: rarity_of(row),
            element: row.raw("ElementalType").and_then(|s| Element::parse(&s)),
            weapon_type: row.raw("WeaponType").and_then(|s| WeaponType::parse(&s)),
            availability: Availability::parse(&row.raw("Availability").unwrap_or_default()),
            max_hp: row.int("MaxHp"),
            max_str: row.int("MaxAtk"),
            skill_1: row.raw("Skill1Name").and_then(|s| store.skill(&s)),
            skill_2: row.raw("Skill2Name").and_then(|s| store.skill(&s)),
            ability_1: store.ability_group(&row.series("Abilities1", 1..=4)),
            ability_2: store.ability_group(&row.series("Abilities2", 1..=4)),
            ability_3: store.ability_group(&row.series("Abilities3", 1..=4)),
            coability: store.ability_group(&row.series("ExAbilityData", 1..=5)),
            chain_coability: store.ability_group(&row.series("ExAbility2Data", 1..=5)),
            obtained: row.text("Obtain"),
            release_date: row.date("ReleaseDate"),
        })
    }

    /// A bare adventurer, for tests and synthetic data.
    pub fn new(name: impl Into<String>, rarity: u8, availability: Availability) -> Self {
        Self {
            name: name.into(),
            title: None,
            rarity: Some(rarity),
            element: None,
            weapon_type: None,
            availability,
            max_hp: None,
            max_str: None,
            skill_1: None,
            skill_2: None,
            ability_1: Vec::new(),
            ability_2: Vec::new(),
            ability_3: Vec::new(),
            coability: Vec::new(),
            chain_coability: Vec::new(),
            obtained: None,
            release_date: None,
        }
    }

    /// "Name: Title", or just the name when untitled.
    pub fn full_name(&self) -> String {
        match &self.title {
            Some(title) => format!("{}: {title}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Entity for Adventurer {
    fn key(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Adventurer
    }

    fn render(&self) -> Embed {
        let skills = [&self.skill_1, &self.skill_2]
            .into_iter()
            .flatten()
            .map(|s| s.name.clone())
            .collect::<Vec<_>>()
            .join("\n");
        let groups = [
            self.ability_1.as_slice(),
            self.ability_2.as_slice(),
            self.ability_3.as_slice(),
        ];

        Embed::new()
            .title(self.full_name())
            .url(wiki_link(&self.name))
            .color(self.element.map_or(NEUTRAL_COLOR, Element::color))
            .description(summary_line(self.rarity, self.element, self.weapon_type))
            .field("Max Stats", stats_line(self.max_hp, self.max_str), true)
            .field("Skills", skills, false)
            .field("Abilities", highest_ability_names(&groups), false)
            .field(
                "Co-ability",
                describe_highest(&self.coability).unwrap_or_default(),
                true,
            )
            .field(
                "Chain Co-ability",
                describe_highest(&self.chain_coability).unwrap_or_default(),
                true,
            )
            .footer(origin_footer(
                self.obtained.as_deref(),
                &self.availability,
                self.release_date.as_ref(),
            ))
    }

    fn ability_groups(&self) -> Vec<&[Arc<Ability>]> {
        vec![
            self.ability_1.as_slice(),
            self.ability_2.as_slice(),
            self.ability_3.as_slice(),
            self.coability.as_slice(),
            self.chain_coability.as_slice(),
        ]
    }
}

/// A dragon companion.
#[derive(Debug, Clone)]
pub struct Dragon {
    /// Name; also the table key.
    pub name: String,
    /// Rarity (3-5).
    pub rarity: Option<u8>,
    /// Element.
    pub element: Option<Element>,
    /// Summon availability.
    pub availability: Availability,
    /// Max HP.
    pub max_hp: Option<i64>,
    /// Max strength.
    pub max_str: Option<i64>,
    /// Dragon skill.
    pub skill: Option<Arc<Skill>>,
    /// First ability, lowest to highest tier.
    pub ability_1: Vec<Arc<Ability>>,
    /// Second ability.
    pub ability_2: Vec<Arc<Ability>>,
    /// Where the dragon comes from.
    pub obtained: Option<String>,
    /// Release date.
    pub release_date: Option<DateTime<Utc>>,
}

impl Dragon {
    /// Parse a row of the dragons table.
    pub fn from_row(row: &Row<'_>, store: &EntityStore) -> Option<Self> {
        let name = row.raw("Name")?;
        Some(Self {
            name,
            rarity: rarity_of(row),
            element: row.raw("ElementalType").and_then(|s| Element::parse(&s)),
            availability: Availability::parse(&row.raw("Availability").unwrap_or_default()),
            max_hp: row.int("MaxHp"),
            max_str: row.int("MaxAtk"),
            skill: row.raw("SkillName").and_then(|s| store.skill(&s)),
            ability_1: store.ability_group(&row.series("Abilities1", 1..=2)),
            ability_2: store.ability_group(&row.series("Abilities2", 1..=2)),
            obtained: row.text("Obtain"),
            release_date: row.date("ReleaseDate"),
        })
    }

    /// A bare dragon, for tests and synthetic data.
    pub fn new(name: impl Into<String>, rarity: u8, availability: Availability) -> Self {
        Self {
            name: name.into(),
            rarity: Some(rarity),
            element: None,
            availability,
            max_hp: None,
            max_str: None,
            skill: None,
            ability_1: Vec::new(),
            ability_2: Vec::new(),
            obtained: None,
            release_date: None,
        }
    }

    /// Card listing both abilities at their highest tier.
    pub fn render_abilities(&self) -> Embed {
        let text = [self.ability_1.as_slice(), self.ability_2.as_slice()]
            .into_iter()
            .filter_map(describe_highest)
            .collect::<Vec<_>>()
            .join("\n\n");
        Embed::new()
            .title(format!("{} Abilities", self.name))
            .url(wiki_link(&self.name))
            .color(self.element.map_or(NEUTRAL_COLOR, Element::color))
            .description(text)
    }
}

impl Entity for Dragon {
    fn key(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Dragon
    }

    fn render(&self) -> Embed {
        let groups = [self.ability_1.as_slice(), self.ability_2.as_slice()];
        Embed::new()
            .title(&self.name)
            .url(wiki_link(&self.name))
            .color(self.element.map_or(NEUTRAL_COLOR, Element::color))
            .description(summary_line(self.rarity, self.element, None))
            .field("Max Stats", stats_line(self.max_hp, self.max_str), true)
            .field(
                "Skill",
                self.skill.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                true,
            )
            .field("Abilities", highest_ability_names(&groups), false)
            .footer(origin_footer(
                self.obtained.as_deref(),
                &self.availability,
                self.release_date.as_ref(),
            ))
    }

    fn ability_groups(&self) -> Vec<&[Arc<Ability>]> {
        vec![self.ability_1.as_slice(), self.ability_2.as_slice()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn store_with_features() -> EntityStore {
        let mut store = EntityStore::default();
        store.insert_skill(Skill::named("Dark Fervor"));
        store.insert_ability(Ability::new("a1", "Strength +5%", "Strength"));
        store.insert_ability(Ability::new("a2", "Strength +10%", "Strength"));
        store
    }

    fn fields(v: Value) -> serde_json::Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn adventurer_links_features() {
        let store = store_with_features();
        let f = fields(json!({
            "Name": "Gala Leonidas",
            "Title": "Ruler of the Dark",
            "Rarity": "5",
            "ElementalType": "Shadow",
            "WeaponType": "Sword",
            "Availability": "Gala",
            "Skill1Name": "Dark Fervor",
            "Skill2Name": "Unknown Skill",
            "Abilities11": "a1",
            "Abilities12": "a2",
            "Abilities13": "missing"
        }));
        let adv = Adventurer::from_row(&Row::new("adventurers", &f), &store).unwrap();
        assert_eq!(adv.full_name(), "Gala Leonidas: Ruler of the Dark");
        assert_eq!(adv.rarity, Some(5));
        assert_eq!(adv.availability, Availability::Gala);
        assert_eq!(adv.skill_1.as_ref().unwrap().name, "Dark Fervor");
        assert!(adv.skill_2.is_none());
        assert_eq!(adv.ability_1.len(), 2);
        assert_eq!(adv.ability_1.last().unwrap().name, "Strength +10%");
    }

    #[test]
    fn adventurer_render_summary() {
        let mut adv = Adventurer::new("Euden", 4, Availability::Permanent);
        adv.element = Some(Element::Flame);
        adv.weapon_type = Some(WeaponType::Sword);
        let e = adv.render();
        assert_eq!(e.title.as_deref(), Some("Euden"));
        assert_eq!(e.description.as_deref(), Some("4★ Flame Sword"));
        assert_eq!(e.color, Some(Element::Flame.color()));
    }

    #[test]
    fn dragon_abilities_card() {
        let store = store_with_features();
        let mut dragon = Dragon::new("Agni", 5, Availability::Permanent);
        dragon.ability_1 = store.ability_group(&["a1".to_string(), "a2".to_string()]);
        let e = dragon.render_abilities();
        assert_eq!(e.title.as_deref(), Some("Agni Abilities"));
        assert_eq!(e.description.as_deref(), Some("**Strength +10%**"));
        assert_eq!(dragon.ability_groups().len(), 2);
    }
}
