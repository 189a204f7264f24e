//! Query generation from entity data.
//!
//! Every entity is registered under its lowercase name plus any configured
//! aliases, and sub-features get composite keys such as `"<name> s1"` or
//! `"<name> a2"`. Equipment also gets descriptor keys built from rarity,
//! element, and weapon type.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{info, warn};

use notte_core::{
    Ability, Availability, Embed, Entity, EntityKind, EntityRef, EntityStore, Weapon,
};

use crate::error::QueryResult;
use crate::index::FuzzyIndex;
use crate::payload::QueryPayload;

const DISAMBIGUATION_COLOR: u32 = 0xFF7000;
const DISAMBIGUATION_LIMIT: usize = 15;
const LEADING_ARTICLES: [&str; 3] = ["a", "an", "the"];
const SHOWCASE_REPLACEMENTS: [(&str, &str); 2] = [("part one", "part 1"), ("part two", "part 2")];

/// Source of per-category query aliases (alias to canonical name).
pub trait AliasProvider {
    /// Aliases for one category. Absent categories yield an empty map.
    fn aliases(&self, kind: EntityKind) -> BTreeMap<String, String>;
}

/// An alias provider with no aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl AliasProvider for NoAliases {
    fn aliases(&self, _kind: EntityKind) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Aliases keyed by category name (`"adventurer"`, `"dragon"`, ...), the
/// shape used in configuration files.
impl AliasProvider for BTreeMap<String, BTreeMap<String, String>> {
    fn aliases(&self, kind: EntityKind) -> BTreeMap<String, String> {
        self.get(kind.as_str()).cloned().unwrap_or_default()
    }
}

/// Builds a complete [`FuzzyIndex`] from an [`EntityStore`].
pub struct QueryBuilder<'a> {
    store: &'a EntityStore,
    aliases: &'a dyn AliasProvider,
    disambiguation: BTreeMap<String, String>,
    index: FuzzyIndex<QueryPayload>,
}

impl<'a> QueryBuilder<'a> {
    /// A builder over `store` using `aliases`.
    pub fn new(store: &'a EntityStore, aliases: &'a dyn AliasProvider) -> Self {
        Self {
            store,
            aliases,
            disambiguation: BTreeMap::new(),
            index: FuzzyIndex::new(),
        }
    }

    /// Descriptions shown on ability disambiguation cards, keyed by generic
    /// ability name.
    pub fn with_disambiguation(mut self, descriptions: BTreeMap<String, String>) -> Self {
        self.disambiguation = descriptions;
        self
    }

    /// Generate every query and return the finished index.
    pub fn build(mut self) -> QueryResult<FuzzyIndex<QueryPayload>> {
        self.adventurer_queries()?;
        self.dragon_queries()?;
        self.wyrmprint_queries()?;
        self.weapon_queries()?;
        self.skill_queries()?;
        self.ability_queries()?;
        self.showcase_queries()?;
        info!(queries = self.index.len(), "Generated queries");
        Ok(self.index)
    }

    fn add(&mut self, key: &str, payload: impl Into<QueryPayload>) -> QueryResult<()> {
        self.index.add(key, payload.into()).map(|_| ())
    }

    fn add_quiet(&mut self, key: &str, payload: impl Into<QueryPayload>) -> QueryResult<()> {
        self.index.add_quiet(key, payload.into()).map(|_| ())
    }

    /// Lowercase name to entity, with aliases merged in.
    fn name_map<T: Entity>(
        &self,
        kind: EntityKind,
        entities: &BTreeMap<String, Arc<T>>,
    ) -> BTreeMap<String, Arc<T>> {
        let mut names: BTreeMap<String, Arc<T>> = entities
            .values()
            .map(|e| (e.name().to_lowercase(), Arc::clone(e)))
            .collect();
        for (alias, target) in self.aliases.aliases(kind) {
            let alias = alias.to_lowercase();
            let Some(resolved) = names.get(&target.to_lowercase()).cloned() else {
                warn!(%alias, %target, %kind, "Alias doesn't resolve to any entity");
                continue;
            };
            if names.contains_key(&alias) {
                warn!(%alias, %kind, "Alias already exists as an entity name");
            }
            names.insert(alias, resolved);
        }
        names
    }

    fn adventurer_queries(&mut self) -> QueryResult<()> {
        let adventurers = self.name_map(EntityKind::Adventurer, self.store.adventurers());
        for (name, a) in adventurers {
            self.add(&name, EntityRef::Adventurer(Arc::clone(&a)))?;
            let mut has_shared_skill = false;
            for (slot, skill) in [("s1", &a.skill_1), ("s2", &a.skill_2)] {
                let Some(skill) = skill else { continue };
                self.add(&format!("{name} {slot}"), EntityRef::Skill(Arc::clone(skill)))?;
                if skill.share_cost.is_some() {
                    self.add(&format!("{name} ss"), EntityRef::Skill(Arc::clone(skill)))?;
                    has_shared_skill = true;
                }
            }
            if !has_shared_skill {
                let text = format!("{} doesn't have a shared skill.", a.full_name());
                self.add(&format!("{name} ss"), Embed::new().description(text))?;
            }
            for (slot, group) in [("a1", &a.ability_1), ("a2", &a.ability_2), ("a3", &a.ability_3)] {
                if let Some(ab) = group.last() {
                    self.add(&format!("{name} {slot}"), EntityRef::Ability(Arc::clone(ab)))?;
                }
            }
            if let Some(coab) = a.coability.last() {
                for suffix in ["coability", "coab", "ca"] {
                    self.add(&format!("{name} {suffix}"), EntityRef::Ability(Arc::clone(coab)))?;
                }
            }
            if let Some(cc) = a.chain_coability.last() {
                for suffix in ["chain coability", "chain coab", "chain", "cca", "cc"] {
                    self.add(&format!("{name} {suffix}"), EntityRef::Ability(Arc::clone(cc)))?;
                }
            }
        }
        Ok(())
    }

    fn dragon_queries(&mut self) -> QueryResult<()> {
        let dragons = self.name_map(EntityKind::Dragon, self.store.dragons());
        for (name, d) in dragons {
            self.add(&name, EntityRef::Dragon(Arc::clone(&d)))?;
            if let Some(skill) = &d.skill {
                for suffix in ["skill", "s1"] {
                    self.add(&format!("{name} {suffix}"), EntityRef::Skill(Arc::clone(skill)))?;
                }
            }
            if let Some(ab) = d.ability_1.last() {
                for suffix in ["ability", "a1"] {
                    self.add(&format!("{name} {suffix}"), EntityRef::Ability(Arc::clone(ab)))?;
                }
            }
            if let Some(ab) = d.ability_2.last() {
                self.add(&format!("{name} a2"), EntityRef::Ability(Arc::clone(ab)))?;
            }
            if !d.ability_1.is_empty() || !d.ability_2.is_empty() {
                let card = d.render_abilities();
                for suffix in ["abilities", "aura"] {
                    self.add(&format!("{name} {suffix}"), card.clone())?;
                }
            }
        }
        Ok(())
    }

    fn wyrmprint_queries(&mut self) -> QueryResult<()> {
        let wyrmprints = self.name_map(EntityKind::Wyrmprint, self.store.wyrmprints());
        for (wp_name, wp) in wyrmprints {
            let mut names = vec![wp_name.clone()];
            if let Some((first, rest)) = wp_name.split_once(' ') {
                if LEADING_ARTICLES.contains(&first) {
                    names.push(rest.to_string());
                }
            }
            for name in names {
                self.add(&name, EntityRef::Wyrmprint(Arc::clone(&wp)))?;
                for (slot, group) in [("a1", &wp.ability_1), ("a2", &wp.ability_2), ("a3", &wp.ability_3)] {
                    if let Some(ab) = group.last() {
                        self.add(&format!("{name} {slot}"), EntityRef::Ability(Arc::clone(ab)))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn weapon_queries(&mut self) -> QueryResult<()> {
        let weapons = self.name_map(EntityKind::Weapon, self.store.weapons());
        for (name, w) in weapons {
            for desc in weapon_descriptors(&name, &w) {
                self.add(&desc, EntityRef::Weapon(Arc::clone(&w)))?;
                if let Some(skill) = &w.skill {
                    for suffix in ["skill", "s1"] {
                        self.add(&format!("{desc} {suffix}"), EntityRef::Skill(Arc::clone(skill)))?;
                    }
                }
                for (slot, group) in [("a1", &w.ability_1), ("a2", &w.ability_2)] {
                    if let Some(ab) = group.last() {
                        self.add(&format!("{desc} {slot}"), EntityRef::Ability(Arc::clone(ab)))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn skill_queries(&mut self) -> QueryResult<()> {
        let skills = self.name_map(EntityKind::Skill, self.store.skills());
        for (name, s) in skills {
            self.add(&name, EntityRef::Skill(s))?;
        }
        Ok(())
    }

    fn ability_queries(&mut self) -> QueryResult<()> {
        let abilities = self.name_map(EntityKind::Ability, self.store.abilities());

        // Distinct variants per generic name, keyed by id.
        let mut variants: BTreeMap<String, BTreeMap<String, Arc<Ability>>> = BTreeMap::new();
        for (name, ab) in abilities {
            self.add_quiet(&name, EntityRef::Ability(Arc::clone(&ab)))?;
            variants
                .entry(ab.generic_name.clone())
                .or_default()
                .insert(ab.id.clone(), ab);
        }

        // Which entities carry each generic ability, and at which tier.
        let mut sources: BTreeMap<String, BTreeMap<(EntityKind, String), Arc<Ability>>> =
            BTreeMap::new();
        let carriers = [
            EntityKind::Adventurer,
            EntityKind::Dragon,
            EntityKind::Wyrmprint,
            EntityKind::Weapon,
        ];
        for kind in carriers {
            for entity in self.store.entities(kind) {
                for group in entity.ability_groups() {
                    for ab in group {
                        sources
                            .entry(ab.generic_name.clone())
                            .or_default()
                            .insert((kind, entity.key().to_string()), Arc::clone(ab));
                    }
                }
            }
        }

        for (generic, source_map) in sources {
            let description = self.disambiguation.get(&generic).cloned();
            if source_map.len() == 1 {
                if let Some(ab) = source_map.into_values().next() {
                    self.add_quiet(&generic, EntityRef::Ability(ab))?;
                }
                if description.is_some() {
                    warn!(%generic, "Disambiguation specified for unique generic ability");
                }
                continue;
            }

            let group = variants.get(&generic).cloned().unwrap_or_default();
            if group.len() == 1 {
                if let Some(ab) = group.into_values().next() {
                    self.add_quiet(&generic, EntityRef::Ability(ab))?;
                }
                continue;
            }
            if group.is_empty() {
                continue;
            }

            let desc = match description {
                Some(d) => format!("*{d}*"),
                None => {
                    warn!(%generic, "No description for common generic ability");
                    String::new()
                }
            };
            let names: BTreeSet<&str> = group.values().map(|ab| ab.name.as_str()).collect();
            let mut names: Vec<&str> = names.into_iter().collect();
            names.sort_by(|a, b| natural_cmp(b, a));
            if names.len() > DISAMBIGUATION_LIMIT {
                names.truncate(DISAMBIGUATION_LIMIT);
                names.push("...");
            }
            let card = Embed::new()
                .title(format!("{generic} (Disambiguation)"))
                .description(format!("{desc}\n\n{}", names.join("\n")).trim())
                .color(DISAMBIGUATION_COLOR);
            self.add(&generic, card)?;
        }
        Ok(())
    }

    fn showcase_queries(&mut self) -> QueryResult<()> {
        let showcases = self.name_map(EntityKind::Showcase, self.store.showcases());
        for (name, sc) in showcases {
            self.add(&name, EntityRef::Showcase(Arc::clone(&sc)))?;
            for (old, new) in SHOWCASE_REPLACEMENTS {
                if name.contains(old) {
                    self.add(&name.replace(old, new), EntityRef::Showcase(Arc::clone(&sc)))?;
                }
            }
        }
        Ok(())
    }
}

/// Build the query index for `store` in one call.
pub fn build_index(
    store: &EntityStore,
    aliases: &dyn AliasProvider,
    disambiguation: BTreeMap<String, String>,
) -> QueryResult<FuzzyIndex<QueryPayload>> {
    QueryBuilder::new(store, aliases)
        .with_disambiguation(disambiguation)
        .build()
}

/// Every key a weapon is known by: its name plus rarity, element, and
/// type descriptors for series weapons.
pub fn weapon_descriptors(name: &str, w: &Weapon) -> Vec<String> {
    let mut descriptors = vec![name.to_string()];
    let (Some(rarity), Some(element), Some(weapon_type)) = (w.rarity, w.element, w.weapon_type)
    else {
        return descriptors;
    };
    for element_name in element.names() {
        let suffix = format!("{element_name} {}", weapon_type.name());
        match (&w.availability, w.tier) {
            (Availability::Core, _) => descriptors.push(format!("{rarity}* {suffix}")),
            (Availability::HighDragon, Some(tier)) => {
                descriptors.push(format!("d{tier} {suffix}"));
                descriptors.push(format!("h{tier} {suffix}"));
            }
            (Availability::Agito, Some(tier)) => {
                descriptors.push(format!("a{tier} {suffix}"));
                if tier == 1 {
                    descriptors.push(format!("{rarity}* {suffix}"));
                }
            }
            (Availability::HighDragon | Availability::Agito, None) => {}
            (_, Some(tier)) if w.name.starts_with("Chimeratech") => {
                descriptors.push(format!("ct{tier} {suffix}"));
            }
            _ => {}
        }
    }
    descriptors
}

/// Numeric-aware string ordering: digit runs compare by value, so
/// `"+5%"` sorts before `"+10%"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let (chunk_a, rest_a) = split_chunk(a);
        let (chunk_b, rest_b) = split_chunk(b);
        let order = match (chunk_a, chunk_b) {
            (Chunk::Number(x), Chunk::Number(y)) => {
                let x = x.trim_start_matches('0');
                let y = y.trim_start_matches('0');
                x.len().cmp(&y.len()).then_with(|| x.cmp(y))
            }
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if order != Ordering::Equal {
            return order;
        }
        a = rest_a;
        b = rest_b;
    }
}

enum Chunk<'s> {
    Number(&'s str),
    Text(&'s str),
}

fn split_chunk(s: &str) -> (Chunk<'_>, &str) {
    let digits = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != digits)
        .unwrap_or(s.len());
    let (head, tail) = s.split_at(end);
    if digits {
        (Chunk::Number(head), tail)
    } else {
        (Chunk::Text(head), tail)
    }
}
