use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::embed::Embed;
use crate::equipment::{Weapon, Wyrmprint};
use crate::feature::{Ability, Skill};
use crate::showcase::Showcase;
use crate::unit::{Adventurer, Dragon};

/// The closed set of entity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A playable character.
    Adventurer,
    /// A shapeshifting companion.
    Dragon,
    /// An equippable print carrying abilities.
    Wyrmprint,
    /// An equippable weapon.
    Weapon,
    /// An active skill.
    Skill,
    /// A passive ability.
    Ability,
    /// A historical summon showcase.
    Showcase,
}

impl EntityKind {
    /// Every kind, in data loading order (dependencies first).
    pub fn all() -> &'static [Self] {
        &[
            Self::Ability,
            Self::Skill,
            Self::Adventurer,
            Self::Dragon,
            Self::Wyrmprint,
            Self::Weapon,
            Self::Showcase,
        ]
    }

    /// Lowercase singular name, as used for alias configuration sections.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adventurer => "adventurer",
            Self::Dragon => "dragon",
            Self::Wyrmprint => "wyrmprint",
            Self::Weapon => "weapon",
            Self::Skill => "skill",
            Self::Ability => "ability",
            Self::Showcase => "showcase",
        }
    }

    /// Name of the data table holding this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::Adventurer => "adventurers",
            Self::Dragon => "dragons",
            Self::Wyrmprint => "wyrmprints",
            Self::Weapon => "weapons",
            Self::Skill => "skills",
            Self::Ability => "abilities",
            Self::Showcase => "showcases",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Elemental affinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Flame (also queried as "fire").
    Flame,
    /// Water.
    Water,
    /// Wind.
    Wind,
    /// Light.
    Light,
    /// Shadow (also queried as "dark").
    Shadow,
}

impl Element {
    /// Parse an element name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flame" | "fire" => Some(Self::Flame),
            "water" => Some(Self::Water),
            "wind" => Some(Self::Wind),
            "light" => Some(Self::Light),
            "shadow" | "dark" => Some(Self::Shadow),
            _ => None,
        }
    }

    /// Every name players use for this element in queries.
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Flame => &["flame", "fire"],
            Self::Water => &["water"],
            Self::Wind => &["wind"],
            Self::Light => &["light"],
            Self::Shadow => &["shadow", "dark"],
        }
    }

    /// Accent colour used in embeds.
    pub fn color(self) -> u32 {
        match self {
            Self::Flame => 0xE73031,
            Self::Water => 0x1890DE,
            Self::Wind => 0x00D77A,
            Self::Light => 0xFFBC0D,
            Self::Shadow => 0xA738DE,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flame => write!(f, "Flame"),
            Self::Water => write!(f, "Water"),
            Self::Wind => write!(f, "Wind"),
            Self::Light => write!(f, "Light"),
            Self::Shadow => write!(f, "Shadow"),
        }
    }
}

/// Weapon class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponType {
    /// Sword.
    Sword,
    /// Blade.
    Blade,
    /// Dagger.
    Dagger,
    /// Axe.
    Axe,
    /// Lance.
    Lance,
    /// Bow.
    Bow,
    /// Wand.
    Wand,
    /// Staff.
    Staff,
    /// Manacaster.
    Manacaster,
}

impl WeaponType {
    /// Parse a weapon type name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sword" => Some(Self::Sword),
            "blade" => Some(Self::Blade),
            "dagger" => Some(Self::Dagger),
            "axe" => Some(Self::Axe),
            "lance" => Some(Self::Lance),
            "bow" => Some(Self::Bow),
            "wand" => Some(Self::Wand),
            "staff" => Some(Self::Staff),
            "manacaster" => Some(Self::Manacaster),
            _ => None,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sword => "Sword",
            Self::Blade => "Blade",
            Self::Dagger => "Dagger",
            Self::Axe => "Axe",
            Self::Lance => "Lance",
            Self::Bow => "Bow",
            Self::Wand => "Wand",
            Self::Staff => "Staff",
            Self::Manacaster => "Manacaster",
        }
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How an entity is obtained. Unrecognized values are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    /// Always in the summon pool.
    Permanent,
    /// Only in gala showcases.
    Gala,
    /// Only in its own limited showcases.
    Limited,
    /// Standard crafted equipment.
    Core,
    /// High Dragon trial equipment.
    HighDragon,
    /// Agito equipment.
    Agito,
    /// Void battle equipment.
    Void,
    /// Unknown.
    #[default]
    Unknown,
    /// Any other value.
    Other(String),
}

impl Availability {
    /// Parse an availability tag. Blank input yields [`Availability::Unknown`].
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" => Self::Unknown,
            "Permanent" => Self::Permanent,
            "Gala" => Self::Gala,
            "Limited" => Self::Limited,
            "Core" => Self::Core,
            "High Dragon" => Self::HighDragon,
            "Agito" => Self::Agito,
            "Void" => Self::Void,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => write!(f, "Permanent"),
            Self::Gala => write!(f, "Gala"),
            Self::Limited => write!(f, "Limited"),
            Self::Core => write!(f, "Core"),
            Self::HighDragon => write!(f, "High Dragon"),
            Self::Agito => write!(f, "Agito"),
            Self::Void => write!(f, "Void"),
            Self::Unknown => write!(f, "Unknown"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Capabilities shared by every entity category.
pub trait Entity {
    /// Unique key within the entity's table.
    fn key(&self) -> &str;

    /// Display name, used for query generation.
    fn name(&self) -> &str;

    /// The entity's category.
    fn kind(&self) -> EntityKind;

    /// Build the card shown when the entity is queried.
    fn render(&self) -> Embed;

    /// Ability groups carried by the entity, each ordered lowest to highest tier.
    fn ability_groups(&self) -> Vec<&[Arc<Ability>]> {
        Vec::new()
    }
}

/// A shared handle to any entity.
#[derive(Debug, Clone)]
pub enum EntityRef {
    /// An adventurer.
    Adventurer(Arc<Adventurer>),
    /// A dragon.
    Dragon(Arc<Dragon>),
    /// A wyrmprint.
    Wyrmprint(Arc<Wyrmprint>),
    /// A weapon.
    Weapon(Arc<Weapon>),
    /// A skill.
    Skill(Arc<Skill>),
    /// An ability.
    Ability(Arc<Ability>),
    /// A showcase.
    Showcase(Arc<Showcase>),
}

impl EntityRef {
    fn inner(&self) -> &dyn Entity {
        match self {
            Self::Adventurer(e) => e.as_ref(),
            Self::Dragon(e) => e.as_ref(),
            Self::Wyrmprint(e) => e.as_ref(),
            Self::Weapon(e) => e.as_ref(),
            Self::Skill(e) => e.as_ref(),
            Self::Ability(e) => e.as_ref(),
            Self::Showcase(e) => e.as_ref(),
        }
    }

    /// The rarity, for categories that have one.
    pub fn rarity(&self) -> Option<u8> {
        match self {
            Self::Adventurer(e) => e.rarity,
            Self::Dragon(e) => e.rarity,
            Self::Wyrmprint(e) => e.rarity,
            Self::Weapon(e) => e.rarity,
            _ => None,
        }
    }
}

impl Entity for EntityRef {
    fn key(&self) -> &str {
        self.inner().key()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn kind(&self) -> EntityKind {
        self.inner().kind()
    }

    fn render(&self) -> Embed {
        self.inner().render()
    }

    fn ability_groups(&self) -> Vec<&[Arc<Ability>]> {
        self.inner().ability_groups()
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers shared by the entity modules
// ---------------------------------------------------------------------------

/// "5★ Shadow Sword"-style summary line.
pub(crate) fn summary_line(
    rarity: Option<u8>,
    element: Option<Element>,
    weapon_type: Option<WeaponType>,
) -> String {
    let mut parts = Vec::new();
    if let Some(r) = rarity {
        parts.push(format!("{r}★"));
    }
    if let Some(e) = element {
        parts.push(e.to_string());
    }
    if let Some(w) = weapon_type {
        parts.push(w.to_string());
    }
    parts.join(" ")
}

/// One line per ability group, naming the highest tier.
pub(crate) fn highest_ability_names(groups: &[&[Arc<Ability>]]) -> String {
    groups
        .iter()
        .filter_map(|g| g.last())
        .map(|ab| ab.name.clone())
        .collect::<Vec<_>>()
        .join("\n")
}

/// "Obtained from X | Released 2019-07-31" footer text.
pub(crate) fn origin_footer(
    obtained: Option<&str>,
    availability: &Availability,
    release_date: Option<&DateTime<Utc>>,
) -> String {
    let mut parts = Vec::new();
    if let Some(o) = obtained {
        parts.push(format!("Obtained from: {o}"));
    }
    if *availability != Availability::Unknown {
        parts.push(availability.to_string());
    }
    if let Some(d) = release_date {
        parts.push(format!("Released {}", d.date_naive()));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_names_and_parse() {
        assert_eq!(Element::parse("Fire"), Some(Element::Flame));
        assert_eq!(Element::parse("dark"), Some(Element::Shadow));
        assert_eq!(Element::parse("void"), None);
        assert_eq!(Element::Shadow.names(), &["shadow", "dark"]);
        assert_eq!(Element::Water.to_string(), "Water");
    }

    #[test]
    fn weapon_type_parse() {
        assert_eq!(WeaponType::parse("manacaster"), Some(WeaponType::Manacaster));
        assert_eq!(WeaponType::parse("Spoon"), None);
        assert_eq!(WeaponType::Lance.name(), "Lance");
    }

    #[test]
    fn availability_parse_roundtrip() {
        assert_eq!(Availability::parse("High Dragon"), Availability::HighDragon);
        assert_eq!(Availability::parse(""), Availability::Unknown);
        assert_eq!(
            Availability::parse("Collab"),
            Availability::Other("Collab".to_string())
        );
        assert_eq!(Availability::HighDragon.to_string(), "High Dragon");
    }

    #[test]
    fn summary_line_skips_missing() {
        assert_eq!(
            summary_line(Some(5), Some(Element::Shadow), Some(WeaponType::Sword)),
            "5★ Shadow Sword"
        );
        assert_eq!(summary_line(None, None, Some(WeaponType::Bow)), "Bow");
    }

    #[test]
    fn kind_names() {
        assert_eq!(EntityKind::Wyrmprint.as_str(), "wyrmprint");
        assert_eq!(EntityKind::Ability.table(), "abilities");
        assert_eq!(EntityKind::all()[0], EntityKind::Ability);
    }
}
