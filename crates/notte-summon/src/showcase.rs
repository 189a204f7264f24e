//! The showcases actors can summon on.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use notte_core::{Entity, EntityStore, Showcase};
use notte_query::FuzzyIndex;

use crate::banner::{Banner, Summoned};
use crate::error::SummonResult;

/// Name of the showcase without featured units.
pub const GENERIC_SHOWCASE: &str = "none";

/// A showcase with its prebuilt banner.
#[derive(Debug)]
pub struct SummonShowcase {
    /// The showcase, or `None` for the generic showcase.
    pub showcase: Option<Arc<Showcase>>,
    /// Pools and rates for summoning.
    pub banner: Banner,
}

impl SummonShowcase {
    /// Display name.
    pub fn name(&self) -> &str {
        match &self.showcase {
            Some(sc) => &sc.name,
            None => GENERIC_SHOWCASE,
        }
    }

    /// Whether this is the generic showcase.
    pub fn is_generic(&self) -> bool {
        self.showcase.is_none()
    }
}

/// Every summonable showcase, plus the generic one.
#[derive(Debug)]
pub struct ShowcaseCatalog {
    generic: Arc<SummonShowcase>,
    by_name: BTreeMap<String, Arc<SummonShowcase>>,
    ordered: Vec<Arc<SummonShowcase>>,
    index: FuzzyIndex<Arc<SummonShowcase>>,
}

impl ShowcaseCatalog {
    /// Build banners for every showcase in `store` that features at least
    /// one known adventurer or dragon.
    pub fn from_store(store: &EntityStore) -> SummonResult<Self> {
        let generic = Arc::new(SummonShowcase {
            showcase: None,
            banner: Banner::new(&[], store),
        });

        let mut showcases: Vec<&Arc<Showcase>> = store
            .showcases()
            .values()
            .filter(|sc| sc.has_featured_units())
            .collect();
        showcases.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.name.cmp(&b.name)));

        let mut by_name = BTreeMap::new();
        let mut ordered = Vec::with_capacity(showcases.len());
        let mut index = FuzzyIndex::new();
        for sc in showcases {
            let featured: Vec<Summoned> = sc
                .featured_adventurers
                .iter()
                .map(|a| Summoned::Adventurer(Arc::clone(a)))
                .chain(sc.featured_dragons.iter().map(|d| Summoned::Dragon(Arc::clone(d))))
                .collect();
            let entry = Arc::new(SummonShowcase {
                showcase: Some(Arc::clone(sc)),
                banner: Banner::new(&featured, store),
            });
            debug!(showcase = sc.key(), gala = entry.banner.is_gala(), "Built banner");
            index.add(&sc.name, Arc::clone(&entry))?;
            by_name.insert(sc.name.to_lowercase(), Arc::clone(&entry));
            ordered.push(entry);
        }
        index.add(GENERIC_SHOWCASE, Arc::clone(&generic))?;
        info!(showcases = ordered.len(), "Summonable showcases ready");

        Ok(Self {
            generic,
            by_name,
            ordered,
            index,
        })
    }

    /// The generic showcase.
    pub fn generic(&self) -> Arc<SummonShowcase> {
        Arc::clone(&self.generic)
    }

    /// Summonable showcases, oldest first. The generic showcase is not
    /// listed.
    pub fn list(&self) -> &[Arc<SummonShowcase>] {
        &self.ordered
    }

    /// Exact, case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<Arc<SummonShowcase>> {
        let name = name.trim().to_lowercase();
        if name == GENERIC_SHOWCASE {
            return Some(self.generic());
        }
        self.by_name.get(&name).cloned()
    }

    /// Exact lookup, falling back to the closest fuzzy match.
    pub fn find(&self, name: &str) -> Option<Arc<SummonShowcase>> {
        self.get(name)
            .or_else(|| self.index.resolve(name.trim()).map(|r| r.payload))
    }
}
