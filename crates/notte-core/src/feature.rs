//! Skills and abilities: the sub-features other entities point at.

use std::sync::Arc;

use crate::embed::Embed;
use crate::entity::{Entity, EntityKind};
use crate::row::Row;
use crate::text::wiki_link;

const SKILL_COLOR: u32 = 0x6A2BBD;
const ABILITY_COLOR: u32 = 0xE39A16;

/// An active skill.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    /// Skill name; also the table key.
    pub name: String,
    /// Description of the highest skill level.
    pub description: Option<String>,
    /// SP cost at max level.
    pub sp: Option<i64>,
    /// Skill share cost, if the skill can be shared.
    pub share_cost: Option<i64>,
    /// SP cost when used as a shared skill.
    pub share_sp: Option<i64>,
}

impl Skill {
    /// Parse a row of the skills table.
    pub fn from_row(row: &Row<'_>) -> Option<Self> {
        let name = row.raw("Name")?;
        let description = (1..=4)
            .rev()
            .find_map(|lv| row.text(&format!("Description{lv}")));
        Some(Self {
            name,
            description,
            sp: row.int("Sp"),
            share_cost: row.int("ShareCost").filter(|c| *c > 0),
            share_sp: row.int("SpShare"),
        })
    }

    /// A bare skill, for tests and synthetic data.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sp: None,
            share_cost: None,
            share_sp: None,
        }
    }
}

impl Entity for Skill {
    fn key(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Skill
    }

    fn render(&self) -> Embed {
        let mut embed = Embed::new()
            .title(&self.name)
            .url(wiki_link(&self.name))
            .color(SKILL_COLOR)
            .description(self.description.clone().unwrap_or_default());
        if let Some(sp) = self.sp {
            embed = embed.field("SP", sp.to_string(), true);
        }
        if let Some(cost) = self.share_cost {
            let share = match self.share_sp {
                Some(sp) => format!("Cost {cost}, {sp} SP"),
                None => format!("Cost {cost}"),
            };
            embed = embed.field("Shared Skill", share, true);
        }
        embed
    }
}

/// A passive ability. Abilities sharing a `generic_name` are tiers or
/// variants of the same effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Ability {
    /// Unique ability id; the table key.
    pub id: String,
    /// Display name, e.g. "Strength +10%".
    pub name: String,
    /// Name shared by every variant, e.g. "Strength".
    pub generic_name: String,
    /// Effect text.
    pub details: Option<String>,
    /// Might contributed by the ability.
    pub might: Option<i64>,
}

impl Ability {
    /// Parse a row of the abilities table.
    pub fn from_row(row: &Row<'_>) -> Option<Self> {
        let id = row.raw("Id")?;
        let name = row.raw("Name")?;
        let generic_name = row.raw("GenericName").unwrap_or_else(|| name.clone());
        Some(Self {
            id,
            name,
            generic_name,
            details: row.text("Details"),
            might: row.int("PartyPowerWeight"),
        })
    }

    /// A bare ability, for tests and synthetic data.
    pub fn new(id: impl Into<String>, name: impl Into<String>, generic_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            generic_name: generic_name.into(),
            details: None,
            might: None,
        }
    }
}

impl Entity for Ability {
    fn key(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Ability
    }

    fn render(&self) -> Embed {
        let mut embed = Embed::new()
            .title(&self.name)
            .color(ABILITY_COLOR)
            .description(self.details.clone().unwrap_or_default());
        if let Some(might) = self.might {
            embed = embed.footer(format!("Might: +{might}"));
        }
        embed
    }
}

/// Format the highest tier of an ability group as "**Name**\nDetails".
pub fn describe_highest(group: &[Arc<Ability>]) -> Option<String> {
    let ab = group.last()?;
    Some(match &ab.details {
        Some(details) => format!("**{}**\n{details}", ab.name),
        None => format!("**{}**", ab.name),
    })
}
