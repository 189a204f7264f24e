//! Banners: the entity pools of one showcase and the draws made on them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use tracing::warn;

use notte_core::{Adventurer, Availability, Dragon, EntityStore};

use crate::error::{SummonError, SummonResult};
use crate::pity::PityState;
use crate::rates::{
    Bucket, Category, LOW_RARITY, MID_RARITY, RARITIES, RateTable, TOP_RARITY, rarity_index,
};

/// Number of draws in a tenfold summon.
pub const MULTI_PULL_SIZE: u32 = 10;

/// A summonable unit.
#[derive(Debug, Clone)]
pub enum Summoned {
    /// An adventurer.
    Adventurer(Arc<Adventurer>),
    /// A dragon.
    Dragon(Arc<Dragon>),
}

impl Summoned {
    /// Unit name.
    pub fn name(&self) -> &str {
        match self {
            Self::Adventurer(a) => &a.name,
            Self::Dragon(d) => &d.name,
        }
    }

    /// Unit rarity.
    pub fn rarity(&self) -> Option<u8> {
        match self {
            Self::Adventurer(a) => a.rarity,
            Self::Dragon(d) => d.rarity,
        }
    }

    /// Unit category.
    pub fn category(&self) -> Category {
        match self {
            Self::Adventurer(_) => Category::Adventurer,
            Self::Dragon(_) => Category::Dragon,
        }
    }

    fn availability(&self) -> &Availability {
        match self {
            Self::Adventurer(a) => &a.availability,
            Self::Dragon(d) => &d.availability,
        }
    }

    fn identity(&self) -> (Category, &str) {
        (self.category(), self.name())
    }

    /// Whether this is a top-rarity unit.
    pub fn is_top_rarity(&self) -> bool {
        self.rarity() == Some(TOP_RARITY)
    }
}

impl fmt::Display for Summoned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rarity() {
            Some(r) => write!(f, "{r}★ {}", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

type Pools = [[[Vec<Summoned>; 2]; 2]; 3];

/// The pools of one showcase. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Banner {
    is_gala: bool,
    pools: Pools,
}

fn slot(bucket: Bucket, category: Category) -> (usize, usize) {
    let b = match bucket {
        Bucket::Featured => 0,
        Bucket::Normal => 1,
    };
    let c = match category {
        Category::Adventurer => 0,
        Category::Dragon => 1,
    };
    (b, c)
}

impl Banner {
    /// Build a banner featuring `featured`, drawing normal units from every
    /// permanent adventurer and dragon in `store`. Gala units join the normal
    /// pool when any featured unit is a gala unit.
    pub fn new(featured: &[Summoned], store: &EntityStore) -> Self {
        let is_gala = featured
            .iter()
            .any(|e| *e.availability() == Availability::Gala);
        let mut banner = Self {
            is_gala,
            pools: Default::default(),
        };

        for e in featured {
            match e.rarity() {
                Some(r) if rarity_index(r).is_some() => banner.push(r, Bucket::Featured, e.clone()),
                Some(r) => warn!(unit = e.name(), rarity = r, "Featured unit has unsummonable rarity"),
                None => {}
            }
        }

        let featured_ids: HashSet<(Category, &str)> = featured.iter().map(Summoned::identity).collect();
        let everyone = store
            .adventurers()
            .values()
            .map(|a| Summoned::Adventurer(Arc::clone(a)))
            .chain(store.dragons().values().map(|d| Summoned::Dragon(Arc::clone(d))));
        for e in everyone {
            if featured_ids.contains(&e.identity()) {
                continue;
            }
            let eligible = match e.availability() {
                Availability::Permanent => true,
                Availability::Gala => is_gala,
                _ => false,
            };
            if let (true, Some(r)) = (eligible, e.rarity()) {
                if rarity_index(r).is_some() {
                    banner.push(r, Bucket::Normal, e);
                }
            }
        }
        banner
    }

    fn push(&mut self, rarity: u8, bucket: Bucket, unit: Summoned) {
        if let Some(r) = rarity_index(rarity) {
            let (b, c) = slot(bucket, unit.category());
            self.pools[r][b][c].push(unit);
        }
    }

    /// Whether this is a gala banner.
    pub fn is_gala(&self) -> bool {
        self.is_gala
    }

    /// Units in one pool.
    pub fn pool(&self, rarity: u8, bucket: Bucket, category: Category) -> &[Summoned] {
        match rarity_index(rarity) {
            Some(r) => {
                let (b, c) = slot(bucket, category);
                &self.pools[r][b][c]
            }
            None => &[],
        }
    }

    fn count(&self, rarity: u8, bucket: Bucket, category: Category) -> f64 {
        self.pool(rarity, bucket, category).len() as f64
    }

    /// Base top-rarity rate in percent, before pity.
    pub fn base_top_rate(&self) -> f64 {
        if self.is_gala { 6.0 } else { 4.0 }
    }

    /// Pity at which the next pull guarantees a top-rarity unit.
    pub fn pity_cap(&self) -> f64 {
        if self.is_gala { 3.0 } else { 5.0 }
    }

    /// Whether `pity` has reached the cap.
    pub fn is_pity_capped(&self, pity: f64) -> bool {
        pity >= self.pity_cap()
    }

    /// The rate table for a pull at the given pity.
    pub fn compute_rates(&self, pity: f64) -> RateTable {
        use Bucket::{Featured, Normal};
        use Category::{Adventurer, Dragon};

        let mut rates = RateTable::new();

        let base_top_rate = self.base_top_rate();
        let total_top_rate = base_top_rate + pity;
        let rate_multi_top = total_top_rate / base_top_rate;
        let featured_top_adv = rate_multi_top * 0.5 * self.count(TOP_RARITY, Featured, Adventurer);
        let featured_top_drg = rate_multi_top * 0.8 * self.count(TOP_RARITY, Featured, Dragon);
        rates.set(TOP_RARITY, Featured, Adventurer, featured_top_adv);
        rates.set(TOP_RARITY, Featured, Dragon, featured_top_drg);
        rates.set(TOP_RARITY, Normal, Adventurer, total_top_rate / 2.0 - featured_top_adv);
        rates.set(TOP_RARITY, Normal, Dragon, total_top_rate / 2.0 - featured_top_drg);

        let featured_mid_adv = self.count(MID_RARITY, Featured, Adventurer);
        let featured_mid_drg = self.count(MID_RARITY, Featured, Dragon);
        let featured_mid_total = featured_mid_adv + featured_mid_drg;
        if featured_mid_total > 0.0 {
            rates.set(MID_RARITY, Featured, Adventurer, 7.0 * featured_mid_adv / featured_mid_total);
            rates.set(MID_RARITY, Featured, Dragon, 7.0 * featured_mid_drg / featured_mid_total);
            rates.set(MID_RARITY, Normal, Adventurer, 5.05);
            rates.set(MID_RARITY, Normal, Dragon, 3.95);
        } else {
            rates.set(MID_RARITY, Normal, Adventurer, 8.55);
            rates.set(MID_RARITY, Normal, Dragon, 7.45);
        }

        let normal_low_split = 80.0 - pity;
        let offset_low = if self.is_gala { -1.0 } else { 0.0 };
        let featured_low_adv = 4.0 * self.count(LOW_RARITY, Featured, Adventurer);
        let featured_low_drg = 4.0 * self.count(LOW_RARITY, Featured, Dragon);
        rates.set(LOW_RARITY, Featured, Adventurer, featured_low_adv);
        rates.set(LOW_RARITY, Featured, Dragon, featured_low_drg);
        rates.set(
            LOW_RARITY,
            Normal,
            Adventurer,
            0.6 * normal_low_split - featured_low_adv + offset_low,
        );
        rates.set(
            LOW_RARITY,
            Normal,
            Dragon,
            0.4 * normal_low_split - featured_low_drg + offset_low,
        );

        rates
    }

    /// Draw one unit: a pool is picked by weight, then a unit uniformly
    /// within it. Pools with no units or a non-positive weight never win.
    pub fn draw(&self, rates: &RateTable, rng: &mut StdRng) -> SummonResult<Summoned> {
        let mut pools = Vec::new();
        let mut weights = Vec::new();
        for (rarity, bucket, category, weight) in rates.entries() {
            let pool = self.pool(rarity, bucket, category);
            if weight > 0.0 && !pool.is_empty() {
                pools.push(pool);
                weights.push(weight);
            }
        }
        if pools.is_empty() {
            return Err(SummonError::EmptyPool);
        }
        let dist =
            WeightedIndex::new(&weights).map_err(|e| SummonError::InvalidWeights(e.to_string()))?;
        let pool = pools[dist.sample(rng)];
        Ok(pool[rng.random_range(0..pool.len())].clone())
    }

    /// One draw, guaranteed top rarity when pity is capped.
    pub fn perform_single(
        &self,
        pity: PityState,
        rng: &mut StdRng,
    ) -> SummonResult<(Summoned, PityState)> {
        let mut rates = self.compute_rates(pity.pity);
        rates.adjust_for_guarantee(self.is_pity_capped(pity.pity), false);
        let result = self.draw(&rates, rng)?;
        let mut pity = pity;
        pity.record(result.is_top_rarity(), 1);
        Ok((result, pity))
    }

    /// Ten draws. The last one is at least mid rarity, and top rarity when
    /// pity is capped.
    pub fn perform_multi(
        &self,
        pity: PityState,
        rng: &mut StdRng,
    ) -> SummonResult<(Vec<Summoned>, PityState)> {
        let mut rates = self.compute_rates(pity.pity);
        let mut results = (1..MULTI_PULL_SIZE)
            .map(|_| self.draw(&rates, rng))
            .collect::<SummonResult<Vec<_>>>()?;
        rates.adjust_for_guarantee(self.is_pity_capped(pity.pity), true);
        results.push(self.draw(&rates, rng)?);
        let got_top = results.iter().any(Summoned::is_top_rarity);
        let mut pity = pity;
        pity.record(got_top, MULTI_PULL_SIZE);
        Ok((results, pity))
    }

    /// Every rarity's total rate for the next pull at `pity`, highest first.
    pub fn describe_rates(&self, pity: f64) -> Vec<(u8, f64)> {
        let mut rates = self.compute_rates(pity);
        rates.adjust_for_guarantee(self.is_pity_capped(pity), false);
        RARITIES
            .into_iter()
            .rev()
            .map(|r| (r, rates.rarity_total(r)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    /// Two permanent adventurers and two permanent dragons per rarity, plus
    /// one gala adventurer.
    fn store() -> EntityStore {
        let mut store = EntityStore::default();
        for rarity in RARITIES {
            for i in 0..2 {
                store.insert_adventurer(Adventurer::new(
                    format!("Adv {rarity}-{i}"),
                    rarity,
                    Availability::Permanent,
                ));
                store.insert_dragon(Dragon::new(
                    format!("Drg {rarity}-{i}"),
                    rarity,
                    Availability::Permanent,
                ));
            }
        }
        store.insert_adventurer(Adventurer::new("Gala Leonidas", 5, Availability::Gala));
        store.insert_adventurer(Adventurer::new("Event Unit", 4, Availability::Limited));
        store
    }

    fn gala_banner(store: &EntityStore) -> Banner {
        let leo = store.adventurer("Gala Leonidas").unwrap();
        Banner::new(&[Summoned::Adventurer(leo)], store)
    }

    #[test]
    fn pools_respect_availability() {
        let store = store();
        let plain = Banner::new(&[], &store);
        assert!(!plain.is_gala());
        assert_eq!(plain.pool(5, Bucket::Normal, Category::Adventurer).len(), 2);
        assert!(plain.pool(5, Bucket::Featured, Category::Adventurer).is_empty());
        assert_eq!(plain.pool(4, Bucket::Normal, Category::Adventurer).len(), 2);

        let gala = gala_banner(&store);
        assert!(gala.is_gala());
        assert_eq!(gala.pool(5, Bucket::Featured, Category::Adventurer).len(), 1);
        // The featured gala unit is not also in the normal pool.
        assert_eq!(gala.pool(5, Bucket::Normal, Category::Adventurer).len(), 2);
    }

    #[test]
    fn gala_normal_pool_includes_other_gala_units() {
        let mut store = store();
        store.insert_adventurer(Adventurer::new("Gala Mym", 5, Availability::Gala));
        let gala = gala_banner(&store);
        assert_eq!(gala.pool(5, Bucket::Normal, Category::Adventurer).len(), 3);
        assert_eq!(Banner::new(&[], &store).pool(5, Bucket::Normal, Category::Adventurer).len(), 2);
    }

    #[test]
    fn plain_rates() {
        let banner = Banner::new(&[], &store());
        let r = banner.compute_rates(0.0);
        assert!((r.get(5, Bucket::Normal, Category::Adventurer) - 2.0).abs() < 1e-9);
        assert!((r.get(4, Bucket::Normal, Category::Adventurer) - 8.55).abs() < 1e-9);
        assert!((r.get(4, Bucket::Normal, Category::Dragon) - 7.45).abs() < 1e-9);
        assert!((r.get(3, Bucket::Normal, Category::Adventurer) - 48.0).abs() < 1e-9);
        assert!((r.get(3, Bucket::Normal, Category::Dragon) - 32.0).abs() < 1e-9);
    }

    #[test]
    fn gala_rates() {
        let store = store();
        let banner = gala_banner(&store);
        let r = banner.compute_rates(1.5);
        // total 7.5, multiplier 1.25
        assert!((r.get(5, Bucket::Featured, Category::Adventurer) - 0.625).abs() < 1e-9);
        assert!((r.get(5, Bucket::Normal, Category::Adventurer) - 3.125).abs() < 1e-9);
        assert!((r.get(5, Bucket::Normal, Category::Dragon) - 3.75).abs() < 1e-9);
        // (80 - 1.5) * 0.6 - 1
        assert!((r.get(3, Bucket::Normal, Category::Adventurer) - 46.1).abs() < 1e-9);
        assert!((r.total() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn featured_mid_rates() {
        let store = store();
        let featured = [Summoned::Adventurer(store.adventurer("Event Unit").unwrap())];
        let r = Banner::new(&featured, &store).compute_rates(0.0);
        assert!((r.get(4, Bucket::Featured, Category::Adventurer) - 7.0).abs() < 1e-9);
        assert_eq!(r.get(4, Bucket::Featured, Category::Dragon), 0.0);
        assert!((r.get(4, Bucket::Normal, Category::Adventurer) - 5.05).abs() < 1e-9);
    }

    #[test]
    fn pity_cap_guarantees_top() {
        let store = store();
        let banner = Banner::new(&[], &store);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let (unit, pity) = banner
                .perform_single(PityState::with_pity(5.0), &mut rng)
                .unwrap();
            assert!(unit.is_top_rarity());
            assert_eq!(pity, PityState::default());
        }
        let gala = gala_banner(&store);
        assert!(gala.is_pity_capped(3.0));
        assert!(!banner.is_pity_capped(4.5));
    }

    #[test]
    fn tenfold_last_pull_is_at_least_mid() {
        let banner = Banner::new(&[], &store());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let (results, _) = banner.perform_multi(PityState::default(), &mut rng).unwrap();
            assert_eq!(results.len(), 10);
            assert!(results[9].rarity().unwrap() >= MID_RARITY);
        }
    }

    #[test]
    fn pity_resets_or_advances_after_tenfold() {
        let banner = Banner::new(&[], &store());
        let mut rng = StdRng::seed_from_u64(3);
        let start = PityState { pity: 1.0, progress: 4 };
        for _ in 0..100 {
            let (results, pity) = banner.perform_multi(start, &mut rng).unwrap();
            if results.iter().any(Summoned::is_top_rarity) {
                assert_eq!(pity, PityState::default());
            } else {
                assert_eq!(pity, PityState { pity: 1.5, progress: 4 });
            }
        }
    }

    #[test]
    fn tenfold_top_rate_matches_expectation() {
        let banner = Banner::new(&[], &store());
        let mut rng = StdRng::seed_from_u64(2024);
        let batches = 1000u32;
        let mut batches_with_top = 0u32;
        let mut top_results = 0;
        for _ in 0..batches {
            let (results, _) = banner.perform_multi(PityState::default(), &mut rng).unwrap();
            let tops = results.iter().filter(|r| r.is_top_rarity()).count();
            top_results += tops;
            if tops > 0 {
                batches_with_top += 1;
            }
        }
        // 4% per draw; the mid guarantee leaves the top share untouched.
        let expected_batch = 1.0 - 0.96f64.powi(10);
        let batch_rate = f64::from(batches_with_top) / f64::from(batches);
        assert!((batch_rate - expected_batch).abs() < 0.06, "batch rate {batch_rate}");
        let result_rate = top_results as f64 / (f64::from(batches) * 10.0);
        assert!((result_rate - 0.04).abs() < 0.01, "result rate {result_rate}");
    }

    #[test]
    fn empty_banner_fails() {
        let banner = Banner::new(&[], &EntityStore::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            banner.perform_single(PityState::default(), &mut rng),
            Err(SummonError::EmptyPool)
        ));
    }

    #[test]
    fn draw_skips_empty_pools() {
        let mut store = EntityStore::default();
        store.insert_dragon(Dragon::new("Only Dragon", 3, Availability::Permanent));
        let banner = Banner::new(&[], &store);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let unit = banner.draw(&banner.compute_rates(0.0), &mut rng).unwrap();
            assert_eq!(unit.name(), "Only Dragon");
        }
    }

    #[test]
    fn describe_rates_shows_guarantee() {
        let banner = Banner::new(&[], &store());
        let rates = banner.describe_rates(5.0);
        assert_eq!(rates[0].0, 5);
        assert!((rates[0].1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn crowded_featured_top_leaves_negative_normal_weight() {
        let mut store = store();
        let mut featured = Vec::new();
        for i in 0..6 {
            store.insert_adventurer(Adventurer::new(format!("Top {i}"), 5, Availability::Limited));
            featured.push(Summoned::Adventurer(store.adventurer(&format!("Top {i}")).unwrap()));
        }
        let banner = Banner::new(&featured, &store);
        assert!(!banner.is_gala());

        let rates = banner.compute_rates(0.0);
        assert!((rates.get(5, Bucket::Normal, Category::Adventurer) + 1.0).abs() < 1e-9);
        assert!((rates.total() - 100.0).abs() < 1e-9);

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..5000 {
            let unit = banner.draw(&rates, &mut rng).unwrap();
            assert!(
                !unit.name().starts_with("Adv 5-"),
                "drew {} from a negative-weight pool",
                unit.name()
            );
        }

        let mut guaranteed = rates;
        guaranteed.adjust_for_guarantee(true, false);
        assert!((guaranteed.rarity_total(TOP_RARITY) - 100.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn rates_sum_to_100(
            pity_steps in 0u32..=10,
            featured_top in 0usize..3,
            featured_mid in 0usize..3,
            gala in any::<bool>(),
        ) {
            let mut store = store();
            let mut featured = Vec::new();
            for i in 0..featured_top {
                let availability = if gala && i == 0 { Availability::Gala } else { Availability::Limited };
                let a = Adventurer::new(format!("Top {i}"), 5, availability);
                store.insert_adventurer(a);
                featured.push(Summoned::Adventurer(store.adventurer(&format!("Top {i}")).unwrap()));
            }
            for i in 0..featured_mid {
                store.insert_dragon(Dragon::new(format!("Mid {i}"), 4, Availability::Limited));
                featured.push(Summoned::Dragon(store.dragon(&format!("Mid {i}")).unwrap()));
            }
            let banner = Banner::new(&featured, &store);
            let pity = f64::from(pity_steps) * 0.5;
            prop_assume!(pity <= banner.pity_cap());

            let rates = banner.compute_rates(pity);
            prop_assert!((rates.total() - 100.0).abs() < 1e-9);

            let mut top = rates.clone();
            top.adjust_for_guarantee(true, true);
            prop_assert_eq!(top.rarity_total(LOW_RARITY), 0.0);
            prop_assert_eq!(top.rarity_total(MID_RARITY), 0.0);
            prop_assert!((top.rarity_total(TOP_RARITY) - 100.0).abs() < 1e-9);

            let mut mid = rates;
            mid.adjust_for_guarantee(false, true);
            prop_assert!((mid.total() - 100.0).abs() < 1e-9);
        }
    }
}
