//! The read-only entity repository.
//!
//! Tables are loaded from a data directory holding one JSON array per
//! category. Skills and abilities are loaded first so that later tables can
//! link to them; showcases are loaded last so that featured units resolve.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::entity::{Entity, EntityKind, EntityRef};
use crate::equipment::{Weapon, Wyrmprint};
use crate::error::{CoreError, CoreResult};
use crate::feature::{Ability, Skill};
use crate::row::Row;
use crate::showcase::Showcase;
use crate::unit::{Adventurer, Dragon};

/// Every loaded entity, keyed per category.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    abilities: BTreeMap<String, Arc<Ability>>,
    skills: BTreeMap<String, Arc<Skill>>,
    adventurers: BTreeMap<String, Arc<Adventurer>>,
    dragons: BTreeMap<String, Arc<Dragon>>,
    wyrmprints: BTreeMap<String, Arc<Wyrmprint>>,
    weapons: BTreeMap<String, Arc<Weapon>>,
    showcases: BTreeMap<String, Arc<Showcase>>,
}

fn insert_unique<T: Entity>(map: &mut BTreeMap<String, Arc<T>>, entity: T) {
    let key = entity.key().to_string();
    if map.contains_key(&key) {
        warn!(kind = %entity.kind(), key = %key, "Duplicate entity key, keeping the first");
        return;
    }
    map.insert(key, Arc::new(entity));
}

/// Read `<dir>/<table>.json` as a list of row objects. A missing file is an
/// empty table.
fn read_table(dir: &Path, table: &str) -> CoreResult<Vec<serde_json::Map<String, Value>>> {
    let path = dir.join(format!("{table}.json"));
    if !path.exists() {
        warn!(path = %path.display(), "Data file not found, treating table as empty");
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path).map_err(|source| CoreError::Io {
        path: path.clone(),
        source,
    })?;
    let value: Value =
        serde_json::from_str(&content).map_err(|source| CoreError::Json { path, source })?;
    let Value::Array(items) = value else {
        return Err(CoreError::InvalidTable(table.to_string()));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(fields) => Ok(fields),
            _ => Err(CoreError::InvalidTable(table.to_string())),
        })
        .collect()
}

impl EntityStore {
    /// Load every table from `dir`.
    pub fn load_dir(dir: &Path) -> CoreResult<Self> {
        let mut store = Self::default();
        for &kind in EntityKind::all() {
            let table = kind.table();
            let rows = read_table(dir, table)?;
            let mut skipped = 0usize;
            for fields in &rows {
                let row = Row::new(table, fields);
                if !store.load_row(kind, &row) {
                    skipped += 1;
                }
            }
            if skipped > 0 {
                warn!(table, skipped, "Skipped rows without a key");
            }
            debug!(table, rows = rows.len(), "Loaded table");
        }
        info!(
            adventurers = store.adventurers.len(),
            dragons = store.dragons.len(),
            wyrmprints = store.wyrmprints.len(),
            weapons = store.weapons.len(),
            skills = store.skills.len(),
            abilities = store.abilities.len(),
            showcases = store.showcases.len(),
            "Entity data loaded"
        );
        Ok(store)
    }

    fn load_row(&mut self, kind: EntityKind, row: &Row<'_>) -> bool {
        let loaded = match kind {
            EntityKind::Ability => Ability::from_row(row).map(|e| self.insert_ability(e)),
            EntityKind::Skill => Skill::from_row(row).map(|e| self.insert_skill(e)),
            EntityKind::Adventurer => {
                Adventurer::from_row(row, self).map(|e| self.insert_adventurer(e))
            }
            EntityKind::Dragon => Dragon::from_row(row, self).map(|e| self.insert_dragon(e)),
            EntityKind::Wyrmprint => {
                Wyrmprint::from_row(row, self).map(|e| self.insert_wyrmprint(e))
            }
            EntityKind::Weapon => Weapon::from_row(row, self).map(|e| self.insert_weapon(e)),
            EntityKind::Showcase => Showcase::from_row(row, self).map(|e| self.insert_showcase(e)),
        };
        loaded.is_some()
    }

    /// Add an ability; duplicate ids keep the first.
    pub fn insert_ability(&mut self, ability: Ability) {
        insert_unique(&mut self.abilities, ability);
    }

    /// Add a skill; duplicate names keep the first.
    pub fn insert_skill(&mut self, skill: Skill) {
        insert_unique(&mut self.skills, skill);
    }

    /// Add an adventurer.
    pub fn insert_adventurer(&mut self, adventurer: Adventurer) {
        insert_unique(&mut self.adventurers, adventurer);
    }

    /// Add a dragon.
    pub fn insert_dragon(&mut self, dragon: Dragon) {
        insert_unique(&mut self.dragons, dragon);
    }

    /// Add a wyrmprint.
    pub fn insert_wyrmprint(&mut self, wyrmprint: Wyrmprint) {
        insert_unique(&mut self.wyrmprints, wyrmprint);
    }

    /// Add a weapon.
    pub fn insert_weapon(&mut self, weapon: Weapon) {
        insert_unique(&mut self.weapons, weapon);
    }

    /// Add a showcase.
    pub fn insert_showcase(&mut self, showcase: Showcase) {
        insert_unique(&mut self.showcases, showcase);
    }

    /// Look up a skill by name.
    pub fn skill(&self, name: &str) -> Option<Arc<Skill>> {
        self.skills.get(name).cloned()
    }

    /// Look up an ability by id.
    pub fn ability(&self, id: &str) -> Option<Arc<Ability>> {
        self.abilities.get(id).cloned()
    }

    /// Resolve a tiered list of ability ids. Unknown ids are dropped.
    pub fn ability_group(&self, ids: &[String]) -> Vec<Arc<Ability>> {
        ids.iter()
            .filter_map(|id| {
                let found = self.ability(id);
                if found.is_none() {
                    debug!(id = %id, "Unknown ability id");
                }
                found
            })
            .collect()
    }

    /// Look up an adventurer by name.
    pub fn adventurer(&self, name: &str) -> Option<Arc<Adventurer>> {
        self.adventurers.get(name).cloned()
    }

    /// Look up a dragon by name.
    pub fn dragon(&self, name: &str) -> Option<Arc<Dragon>> {
        self.dragons.get(name).cloned()
    }

    /// All adventurers, by name.
    pub fn adventurers(&self) -> &BTreeMap<String, Arc<Adventurer>> {
        &self.adventurers
    }

    /// All dragons, by name.
    pub fn dragons(&self) -> &BTreeMap<String, Arc<Dragon>> {
        &self.dragons
    }

    /// All wyrmprints, by name.
    pub fn wyrmprints(&self) -> &BTreeMap<String, Arc<Wyrmprint>> {
        &self.wyrmprints
    }

    /// All weapons, by name.
    pub fn weapons(&self) -> &BTreeMap<String, Arc<Weapon>> {
        &self.weapons
    }

    /// All skills, by name.
    pub fn skills(&self) -> &BTreeMap<String, Arc<Skill>> {
        &self.skills
    }

    /// All abilities, by id.
    pub fn abilities(&self) -> &BTreeMap<String, Arc<Ability>> {
        &self.abilities
    }

    /// All showcases, by name.
    pub fn showcases(&self) -> &BTreeMap<String, Arc<Showcase>> {
        &self.showcases
    }

    /// Every entity of one category, in key order.
    pub fn entities(&self, kind: EntityKind) -> Vec<EntityRef> {
        match kind {
            EntityKind::Adventurer => collect(&self.adventurers, EntityRef::Adventurer),
            EntityKind::Dragon => collect(&self.dragons, EntityRef::Dragon),
            EntityKind::Wyrmprint => collect(&self.wyrmprints, EntityRef::Wyrmprint),
            EntityKind::Weapon => collect(&self.weapons, EntityRef::Weapon),
            EntityKind::Skill => collect(&self.skills, EntityRef::Skill),
            EntityKind::Ability => collect(&self.abilities, EntityRef::Ability),
            EntityKind::Showcase => collect(&self.showcases, EntityRef::Showcase),
        }
    }
}

fn collect<T>(map: &BTreeMap<String, Arc<T>>, wrap: fn(Arc<T>) -> EntityRef) -> Vec<EntityRef> {
    map.values().cloned().map(wrap).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, table: &str, body: &str) {
        fs::write(dir.join(format!("{table}.json")), body).unwrap();
    }

    #[test]
    fn load_links_tables() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "abilities",
            r#"[{"Id": "1", "Name": "Strength +10%", "GenericName": "Strength"}]"#,
        );
        write(dir.path(), "skills", r#"[{"Name": "Dark Fervor", "Sp": "2962"}]"#);
        write(
            dir.path(),
            "adventurers",
            r#"[
                {"Name": "Gala Leonidas", "Rarity": "5", "Availability": "Gala",
                 "Skill1Name": "Dark Fervor", "Abilities11": "1"},
                {"Rarity": "4"}
            ]"#,
        );
        write(
            dir.path(),
            "showcases",
            r#"[{"Name": "Gala Dragalia", "FeaturedAdventurers": "Gala Leonidas"}]"#,
        );

        let store = EntityStore::load_dir(dir.path()).unwrap();
        assert_eq!(store.adventurers().len(), 1);
        assert!(store.dragons().is_empty());
        let leo = store.adventurer("Gala Leonidas").unwrap();
        assert_eq!(leo.skill_1.as_ref().unwrap().name, "Dark Fervor");
        assert_eq!(leo.ability_1[0].generic_name, "Strength");
        let sc = &store.showcases()["Gala Dragalia"];
        assert!(Arc::ptr_eq(&sc.featured_adventurers[0], &leo));
        assert_eq!(store.entities(EntityKind::Skill).len(), 1);
    }

    #[test]
    fn duplicates_keep_first() {
        let mut store = EntityStore::default();
        store.insert_ability(Ability::new("1", "First", "X"));
        store.insert_ability(Ability::new("1", "Second", "X"));
        assert_eq!(store.ability("1").unwrap().name, "First");
    }

    #[test]
    fn non_array_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "skills", r#"{"Name": "x"}"#);
        let err = EntityStore::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTable(t) if t == "skills"));
    }

    #[test]
    fn malformed_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "dragons", "[{");
        assert!(matches!(
            EntityStore::load_dir(dir.path()),
            Err(CoreError::Json { .. })
        ));
    }

    #[test]
    fn ability_group_skips_unknown() {
        let mut store = EntityStore::default();
        store.insert_ability(Ability::new("1", "A", "A"));
        let group = store.ability_group(&["1".to_string(), "9".to_string()]);
        assert_eq!(group.len(), 1);
    }
}
