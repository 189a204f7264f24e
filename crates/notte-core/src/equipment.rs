//! Equippable entities: wyrmprints and weapons.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::embed::Embed;
use crate::entity::{
    Availability, Element, Entity, EntityKind, WeaponType, highest_ability_names, origin_footer,
    summary_line,
};
use crate::feature::{Ability, Skill};
use crate::row::Row;
use crate::store::EntityStore;
use crate::text::wiki_link;

const WYRMPRINT_COLOR: u32 = 0xC0A060;
const WEAPON_COLOR: u32 = 0x7F8C8D;

/// A wyrmprint.
#[derive(Debug, Clone)]
pub struct Wyrmprint {
    /// Name; also the table key.
    pub name: String,
    /// Rarity (2-5).
    pub rarity: Option<u8>,
    /// How the print is obtained.
    pub availability: Availability,
    /// Max HP.
    pub max_hp: Option<i64>,
    /// Max strength.
    pub max_str: Option<i64>,
    /// First ability, lowest to highest tier.
    pub ability_1: Vec<Arc<Ability>>,
    /// Second ability.
    pub ability_2: Vec<Arc<Ability>>,
    /// Third ability.
    pub ability_3: Vec<Arc<Ability>>,
    /// Where the print comes from.
    pub obtained: Option<String>,
    /// Release date.
    pub release_date: Option<DateTime<Utc>>,
}

impl Wyrmprint {
    /// Parse a row of the wyrmprints table.
    pub fn from_row(row: &Row<'_>, store: &EntityStore) -> Option<Self> {
        Some(Self {
            name: row.raw("Name")?,
            rarity: row.int("Rarity").and_then(|r| u8::try_from(r).ok()),
            availability: Availability::parse(&row.raw("Availability").unwrap_or_default()),
            max_hp: row.int("MaxHp"),
            max_str: row.int("MaxAtk"),
            ability_1: store.ability_group(&row.series("Abilities1", 1..=3)),
            ability_2: store.ability_group(&row.series("Abilities2", 1..=3)),
            ability_3: store.ability_group(&row.series("Abilities3", 1..=3)),
            obtained: row.text("Obtain"),
            release_date: row.date("ReleaseDate"),
        })
    }
}

impl Entity for Wyrmprint {
    fn key(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Wyrmprint
    }

    fn render(&self) -> Embed {
        let mut embed = Embed::new()
            .title(&self.name)
            .url(wiki_link(&self.name))
            .color(WYRMPRINT_COLOR)
            .description(summary_line(self.rarity, None, None))
            .field("Abilities", highest_ability_names(&self.ability_groups()), false)
            .footer(origin_footer(
                self.obtained.as_deref(),
                &self.availability,
                self.release_date.as_ref(),
            ));
        if let (Some(hp), Some(s)) = (self.max_hp, self.max_str) {
            embed = embed.field("Max Stats", format!("HP {hp} / Str {s}"), true);
        }
        embed
    }

    fn ability_groups(&self) -> Vec<&[Arc<Ability>]> {
        vec![
            self.ability_1.as_slice(),
            self.ability_2.as_slice(),
            self.ability_3.as_slice(),
        ]
    }
}

/// A weapon.
#[derive(Debug, Clone)]
pub struct Weapon {
    /// Name; also the table key.
    pub name: String,
    /// Rarity (1-6).
    pub rarity: Option<u8>,
    /// Element, if the weapon has one.
    pub element: Option<Element>,
    /// Weapon class.
    pub weapon_type: Option<WeaponType>,
    /// Which weapon series this belongs to.
    pub availability: Availability,
    /// Tier within its series.
    pub tier: Option<i64>,
    /// Weapon skill.
    pub skill: Option<Arc<Skill>>,
    /// First ability.
    pub ability_1: Vec<Arc<Ability>>,
    /// Second ability.
    pub ability_2: Vec<Arc<Ability>>,
    /// Where the weapon comes from.
    pub obtained: Option<String>,
}

impl Weapon {
    /// Parse a row of the weapons table.
    pub fn from_row(row: &Row<'_>, store: &EntityStore) -> Option<Self> {
        Some(Self {
            name: row.raw("WeaponName")?,
            rarity: row.int("Rarity").and_then(|r| u8::try_from(r).ok()),
            element: row.raw("ElementalType").and_then(|s| Element::parse(&s)),
            weapon_type: row.raw("Type").and_then(|s| WeaponType::parse(&s)),
            availability: Availability::parse(&row.raw("Availability").unwrap_or_default()),
            tier: row.int("Tier").filter(|t| *t > 0),
            skill: row.raw("WeaponSkillName").and_then(|s| store.skill(&s)),
            ability_1: store.ability_group(&row.series("Abilities1", 1..=1)),
            ability_2: store.ability_group(&row.series("Abilities2", 1..=1)),
            obtained: row.text("Obtain"),
        })
    }

    /// A bare weapon, for tests and synthetic data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rarity: None,
            element: None,
            weapon_type: None,
            availability: Availability::Unknown,
            tier: None,
            skill: None,
            ability_1: Vec::new(),
            ability_2: Vec::new(),
            obtained: None,
        }
    }
}

impl Entity for Weapon {
    fn key(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Weapon
    }

    fn render(&self) -> Embed {
        let mut description = summary_line(self.rarity, self.element, self.weapon_type);
        if let Some(tier) = self.tier {
            description.push_str(&format!(" (Tier {tier})"));
        }
        Embed::new()
            .title(&self.name)
            .url(wiki_link(&self.name))
            .color(self.element.map_or(WEAPON_COLOR, Element::color))
            .description(description)
            .field(
                "Skill",
                self.skill.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                true,
            )
            .field("Abilities", highest_ability_names(&self.ability_groups()), false)
            .footer(origin_footer(self.obtained.as_deref(), &self.availability, None))
    }

    fn ability_groups(&self) -> Vec<&[Arc<Ability>]> {
        vec![self.ability_1.as_slice(), self.ability_2.as_slice()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fields(v: Value) -> serde_json::Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn weapon_from_row() {
        let mut store = EntityStore::default();
        store.insert_skill(Skill::named("Flame Blade"));
        let f = fields(json!({
            "WeaponName": "Agito Sword",
            "Rarity": "5",
            "ElementalType": "Flame",
            "Type": "Sword",
            "Availability": "Agito",
            "Tier": "1",
            "WeaponSkillName": "Flame Blade"
        }));
        let w = Weapon::from_row(&Row::new("weapons", &f), &store).unwrap();
        assert_eq!(w.availability, Availability::Agito);
        assert_eq!(w.tier, Some(1));
        assert_eq!(w.weapon_type, Some(WeaponType::Sword));
        assert!(w.skill.is_some());
        assert_eq!(w.render().description.as_deref(), Some("5★ Flame Sword (Tier 1)"));
    }

    #[test]
    fn zero_tier_is_absent() {
        let store = EntityStore::default();
        let f = fields(json!({"WeaponName": "Plain", "Tier": "0"}));
        let w = Weapon::from_row(&Row::new("weapons", &f), &store).unwrap();
        assert_eq!(w.tier, None);
    }

    #[test]
    fn wyrmprint_groups() {
        let mut store = EntityStore::default();
        store.insert_ability(Ability::new("1", "Skill Damage +15%", "Skill Damage"));
        store.insert_ability(Ability::new("2", "Skill Damage +20%", "Skill Damage"));
        let f = fields(json!({
            "Name": "A Dog's Day",
            "Rarity": "5",
            "Abilities11": "1",
            "Abilities12": "2"
        }));
        let wp = Wyrmprint::from_row(&Row::new("wyrmprints", &f), &store).unwrap();
        assert_eq!(wp.ability_1.len(), 2);
        assert!(wp.ability_2.is_empty());
        let e = wp.render();
        assert!(e.fields.iter().any(|f| f.value == "Skill Damage +20%"));
    }
}
