//! Holder for the live query index.

use std::fmt::Display;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info};

use crate::index::FuzzyIndex;

/// Shares one [`FuzzyIndex`] between readers and swaps in rebuilt indexes.
///
/// Readers take an `Arc` snapshot and search it without holding the lock,
/// so a lookup always sees one complete index.
#[derive(Debug)]
pub struct Resolver<P> {
    current: RwLock<Arc<FuzzyIndex<P>>>,
}

impl<P> Default for Resolver<P> {
    fn default() -> Self {
        Self::new(FuzzyIndex::default())
    }
}

impl<P> Resolver<P> {
    /// A resolver serving `index`.
    pub fn new(index: FuzzyIndex<P>) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// The index currently being served.
    pub fn snapshot(&self) -> Arc<FuzzyIndex<P>> {
        Arc::clone(&self.current.read())
    }

    /// Replace the served index.
    pub fn replace(&self, index: FuzzyIndex<P>) {
        let index = Arc::new(index);
        *self.current.write() = index;
    }

    /// Build a new index with `build` and swap it in. On failure the current
    /// index keeps serving and the error is returned.
    pub fn rebuild<E: Display>(
        &self,
        build: impl FnOnce() -> Result<FuzzyIndex<P>, E>,
    ) -> Result<usize, E> {
        match build() {
            Ok(index) => {
                let keys = index.len();
                self.replace(index);
                info!(keys, "Query index rebuilt");
                Ok(keys)
            }
            Err(e) => {
                error!(error = %e, "Query index rebuild failed, keeping the previous index");
                Err(e)
            }
        }
    }
}
