//! Summon rate tables.
//!
//! A [`RateTable`] holds one weight (in percent) per rarity, bucket, and
//! category. Tables are built by [`Banner::compute_rates`] and summed to 100
//! by construction; forcing a guaranteed tier rescales whole rarities.
//!
//! [`Banner::compute_rates`]: crate::banner::Banner::compute_rates

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rarity of the rarest summon tier.
pub const TOP_RARITY: u8 = 5;
/// Rarity guaranteed on the last pull of a tenfold.
pub const MID_RARITY: u8 = 4;
/// Lowest summonable rarity.
pub const LOW_RARITY: u8 = 3;
/// Summonable rarities, lowest first.
pub const RARITIES: [u8; 3] = [LOW_RARITY, MID_RARITY, TOP_RARITY];

/// Whether a pool holds rate-up entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Featured on the showcase.
    Featured,
    /// Regularly available.
    Normal,
}

impl Bucket {
    /// Both buckets.
    pub const ALL: [Self; 2] = [Self::Featured, Self::Normal];

    fn index(self) -> usize {
        match self {
            Self::Featured => 0,
            Self::Normal => 1,
        }
    }
}

/// The kind of unit a pool holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Adventurers.
    Adventurer,
    /// Dragons.
    Dragon,
}

impl Category {
    /// Both categories.
    pub const ALL: [Self; 2] = [Self::Adventurer, Self::Dragon];

    fn index(self) -> usize {
        match self {
            Self::Adventurer => 0,
            Self::Dragon => 1,
        }
    }
}

/// Index of a summonable rarity, or `None` outside 3..=5.
pub(crate) fn rarity_index(rarity: u8) -> Option<usize> {
    RARITIES.iter().position(|r| *r == rarity)
}

/// Summon weights per rarity, bucket, and category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    weights: [[[f64; 2]; 2]; 3],
}

impl RateTable {
    /// An all-zero table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of one pool. Rarities outside 3..=5 have weight zero.
    pub fn get(&self, rarity: u8, bucket: Bucket, category: Category) -> f64 {
        rarity_index(rarity).map_or(0.0, |r| self.weights[r][bucket.index()][category.index()])
    }

    /// Set the weight of one pool. Rarities outside 3..=5 are ignored.
    pub fn set(&mut self, rarity: u8, bucket: Bucket, category: Category, weight: f64) {
        if let Some(r) = rarity_index(rarity) {
            self.weights[r][bucket.index()][category.index()] = weight;
        }
    }

    /// Sum of every pool of one rarity.
    pub fn rarity_total(&self, rarity: u8) -> f64 {
        let Some(r) = rarity_index(rarity) else {
            return 0.0;
        };
        let mut total = 0.0;
        for bucket in Bucket::ALL {
            for category in Category::ALL {
                total += self.weights[r][bucket.index()][category.index()];
            }
        }
        total
    }

    /// Sum of the whole table.
    pub fn total(&self) -> f64 {
        RARITIES.iter().map(|r| self.rarity_total(*r)).sum()
    }

    /// Scale one rarity so its pools sum to `new_total`, keeping their
    /// proportions. Returns the previous total. A rarity whose total is
    /// zero has no proportions to keep and is left unchanged.
    pub fn set_rarity_total(&mut self, rarity: u8, new_total: f64) -> f64 {
        let old_total = self.rarity_total(rarity);
        let Some(r) = rarity_index(rarity) else {
            return old_total;
        };
        if old_total == 0.0 {
            return old_total;
        }
        let scale = new_total / old_total;
        for bucket in &mut self.weights[r] {
            for weight in bucket.iter_mut() {
                *weight *= scale;
            }
        }
        old_total
    }

    /// Force a guaranteed tier. A guaranteed top rarity zeroes the lower
    /// tiers and takes the whole table; otherwise a guaranteed mid rarity
    /// absorbs the low rarity's share on top of its own 16%.
    pub fn adjust_for_guarantee(&mut self, guaranteed_top: bool, guaranteed_mid: bool) {
        if guaranteed_top {
            self.set_rarity_total(LOW_RARITY, 0.0);
            self.set_rarity_total(MID_RARITY, 0.0);
            self.set_rarity_total(TOP_RARITY, 100.0);
        } else if guaranteed_mid {
            let old_low = self.set_rarity_total(LOW_RARITY, 0.0);
            self.set_rarity_total(MID_RARITY, 16.0 + old_low);
        }
    }

    /// Every pool with its weight, lowest rarity first.
    pub fn entries(&self) -> impl Iterator<Item = (u8, Bucket, Category, f64)> + '_ {
        RARITIES.into_iter().flat_map(move |rarity| {
            Bucket::ALL.into_iter().flat_map(move |bucket| {
                Category::ALL
                    .into_iter()
                    .map(move |category| (rarity, bucket, category, self.get(rarity, bucket, category)))
            })
        })
    }
}

impl fmt::Display for RateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rarity in RARITIES.into_iter().rev() {
            writeln!(f, "{rarity}★: {:.2}%", self.rarity_total(rarity))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RateTable {
        let mut t = RateTable::new();
        t.set(5, Bucket::Normal, Category::Adventurer, 2.0);
        t.set(5, Bucket::Normal, Category::Dragon, 2.0);
        t.set(4, Bucket::Normal, Category::Adventurer, 8.55);
        t.set(4, Bucket::Normal, Category::Dragon, 7.45);
        t.set(3, Bucket::Normal, Category::Adventurer, 48.0);
        t.set(3, Bucket::Normal, Category::Dragon, 32.0);
        t
    }

    #[test]
    fn totals() {
        let t = sample();
        assert!((t.rarity_total(4) - 16.0).abs() < 1e-9);
        assert!((t.total() - 100.0).abs() < 1e-9);
        assert_eq!(t.get(6, Bucket::Normal, Category::Dragon), 0.0);
    }

    #[test]
    fn guaranteed_top_takes_everything() {
        let mut t = sample();
        t.adjust_for_guarantee(true, true);
        assert_eq!(t.rarity_total(3), 0.0);
        assert_eq!(t.rarity_total(4), 0.0);
        assert!((t.rarity_total(5) - 100.0).abs() < 1e-9);
        assert!((t.get(5, Bucket::Normal, Category::Dragon) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn guaranteed_mid_absorbs_low() {
        let mut t = sample();
        t.adjust_for_guarantee(false, true);
        assert_eq!(t.rarity_total(3), 0.0);
        assert!((t.rarity_total(4) - 96.0).abs() < 1e-9);
        assert!((t.rarity_total(5) - 4.0).abs() < 1e-9);
        assert!((t.get(4, Bucket::Normal, Category::Adventurer) - 8.55 * 6.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_is_not_rescaled() {
        let mut t = RateTable::new();
        assert_eq!(t.set_rarity_total(5, 100.0), 0.0);
        assert_eq!(t.total(), 0.0);
    }

    #[test]
    fn no_guarantee_is_noop() {
        let mut t = sample();
        t.adjust_for_guarantee(false, false);
        assert_eq!(t, sample());
    }

    #[test]
    fn entries_cover_all_pools() {
        assert_eq!(sample().entries().count(), 12);
    }
}
