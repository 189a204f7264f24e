//! Approximate-match index over normalized query keys.
//!
//! Keys live in a BK-tree under the unrestricted Damerau-Levenshtein
//! distance, so a lookup only visits subtrees whose edge distance can still
//! fall within the query's threshold. The threshold grows with the query:
//! `1 + 0.3 * len(query)`, measured in characters.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

use crate::error::{QueryError, QueryResult};

/// Queries longer than the longest key by more than this are rejected
/// without searching.
pub const LENGTH_SLACK: usize = 5;

/// Something an index key can resolve to.
pub trait Payload {
    /// Whether the payload carries nothing worth returning.
    fn is_empty(&self) -> bool {
        false
    }
}

impl<T> Payload for std::sync::Arc<T> {}

/// Maximum edit distance accepted for a query.
pub fn threshold(query: &str) -> f64 {
    1.0 + 0.3 * query.chars().count() as f64
}

/// A key within the threshold of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Edit distance between query and key.
    pub distance: usize,
    /// The matched key.
    pub key: String,
}

/// The best match for a query, with its payload.
#[derive(Debug, Clone)]
pub struct Resolved<P> {
    /// Payload of the matched key.
    pub payload: P,
    /// The matched key.
    pub key: String,
    /// Edit distance between query and key.
    pub distance: usize,
    /// `1 - distance / threshold`; `1.0` for an exact match.
    pub confidence: f64,
}

#[derive(Debug)]
struct Node {
    key: String,
    children: BTreeMap<usize, usize>,
}

#[derive(Debug, Default)]
struct BkTree {
    nodes: Vec<Node>,
}

impl BkTree {
    fn insert(&mut self, key: String, evaluations: &AtomicUsize) {
        if self.nodes.is_empty() {
            self.nodes.push(Node {
                key,
                children: BTreeMap::new(),
            });
            return;
        }
        let mut current = 0;
        loop {
            let d = distance(&self.nodes[current].key, &key, evaluations);
            if d == 0 {
                return;
            }
            match self.nodes[current].children.get(&d) {
                Some(&child) => current = child,
                None => {
                    let index = self.nodes.len();
                    self.nodes.push(Node {
                        key,
                        children: BTreeMap::new(),
                    });
                    self.nodes[current].children.insert(d, index);
                    return;
                }
            }
        }
    }

    fn find(&self, query: &str, radius: usize, evaluations: &AtomicUsize) -> Vec<Match> {
        let mut found = Vec::new();
        if self.nodes.is_empty() {
            return found;
        }
        let mut pending = vec![0usize];
        while let Some(index) = pending.pop() {
            let node = &self.nodes[index];
            let d = distance(&node.key, query, evaluations);
            if d <= radius {
                found.push(Match {
                    distance: d,
                    key: node.key.clone(),
                });
            }
            let low = d.saturating_sub(radius);
            let high = d + radius;
            pending.extend(node.children.range(low..=high).map(|(_, &child)| child));
        }
        found
    }
}

fn distance(a: &str, b: &str, evaluations: &AtomicUsize) -> usize {
    evaluations.fetch_add(1, Ordering::Relaxed);
    strsim::damerau_levenshtein(a, b)
}

/// Fuzzy lookup from lowercase keys to payloads.
#[derive(Debug)]
pub struct FuzzyIndex<P> {
    tree: BkTree,
    payloads: HashMap<String, P>,
    max_key_length: usize,
    evaluations: AtomicUsize,
}

impl<P> Default for FuzzyIndex<P> {
    fn default() -> Self {
        Self {
            tree: BkTree::default(),
            payloads: HashMap::new(),
            max_key_length: 0,
            evaluations: AtomicUsize::new(0),
        }
    }
}

impl<P: Payload> FuzzyIndex<P> {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, warning when it already exists. Returns whether the key
    /// was new.
    pub fn add(&mut self, key: &str, payload: P) -> QueryResult<bool> {
        self.insert(key, payload, false)
    }

    /// Add a key, silently ignoring duplicates.
    pub fn add_quiet(&mut self, key: &str, payload: P) -> QueryResult<bool> {
        self.insert(key, payload, true)
    }

    fn insert(&mut self, key: &str, payload: P, suppress_warning: bool) -> QueryResult<bool> {
        let key = key.to_lowercase();
        if self.payloads.contains_key(&key) {
            if !suppress_warning {
                warn!(key = %key, "Query key already exists, ignoring new addition");
            }
            return Ok(false);
        }
        if payload.is_empty() {
            return Err(QueryError::InvalidPayload(key));
        }
        self.max_key_length = self.max_key_length.max(key.chars().count());
        self.tree.insert(key.clone(), &self.evaluations);
        self.payloads.insert(key, payload);
        Ok(true)
    }
}

impl<P> FuzzyIndex<P> {
    /// Number of keys.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Length in characters of the longest key.
    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// Whether a query is too long to match anything.
    pub fn is_too_long(&self, query: &str) -> bool {
        query.chars().count() > self.max_key_length + LENGTH_SLACK
    }

    /// Total distance computations performed so far, including builds.
    pub fn distance_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Payload stored under an exact key.
    pub fn get(&self, key: &str) -> Option<&P> {
        self.payloads.get(&key.to_lowercase())
    }

    /// Every key within the threshold of `query`, nearest first, ties
    /// broken by key.
    pub fn matches(&self, query: &str) -> Vec<Match> {
        let query = query.to_lowercase();
        if self.is_too_long(&query) {
            return Vec::new();
        }
        let limit = threshold(&query);
        let mut found = self.tree.find(&query, limit.floor() as usize, &self.evaluations);
        found.retain(|m| m.distance as f64 <= limit);
        found.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));
        found
    }
}

impl<P: Clone> FuzzyIndex<P> {
    /// The closest match for `query`, if any.
    pub fn resolve(&self, query: &str) -> Option<Resolved<P>> {
        let best = self.matches(query).into_iter().next()?;
        let payload = self.payloads.get(&best.key)?.clone();
        let confidence = 1.0 - best.distance as f64 / threshold(&query.to_lowercase());
        Some(Resolved {
            payload,
            key: best.key,
            distance: best.distance,
            confidence,
        })
    }
}
