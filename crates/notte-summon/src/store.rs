//! Per-actor summon state.
//!
//! Each actor (a user in a channel) owns a [`SummonProfile`] behind its own
//! lock. [`PityStore::with_profile`] holds that lock for the whole
//! read-modify-write, so two pulls by the same actor are serialized while
//! different actors never wait on each other.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::pity::PityState;

/// Identifies whose pity is being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorKey {
    /// Channel the actor is summoning in.
    pub channel_id: u64,
    /// The actor.
    pub user_id: u64,
}

impl ActorKey {
    /// Key for `user_id` in `channel_id`.
    pub fn new(channel_id: u64, user_id: u64) -> Self {
        Self {
            channel_id,
            user_id,
        }
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.channel_id, self.user_id)
    }
}

/// The selected showcase and accumulated pity of one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummonProfile {
    /// Name of the selected showcase; `None` for the generic showcase.
    pub showcase: Option<String>,
    /// Pity on the selected showcase.
    pub pity: PityState,
}

/// Summon profiles of every actor seen so far.
#[derive(Debug, Default)]
pub struct PityStore {
    profiles: Mutex<HashMap<ActorKey, Arc<Mutex<SummonProfile>>>>,
}

impl PityStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: ActorKey) -> Arc<Mutex<SummonProfile>> {
        let mut profiles = self.profiles.lock();
        Arc::clone(profiles.entry(key).or_default())
    }

    /// Run `f` on the actor's profile while holding the actor's lock.
    pub fn with_profile<R>(&self, key: ActorKey, f: impl FnOnce(&mut SummonProfile) -> R) -> R {
        let slot = self.slot(key);
        let mut profile = slot.lock();
        f(&mut profile)
    }

    /// A copy of the actor's profile.
    pub fn profile(&self, key: ActorKey) -> SummonProfile {
        self.with_profile(key, |p| p.clone())
    }

    /// Number of actors with a profile.
    pub fn len(&self) -> usize {
        self.profiles.lock().len()
    }

    /// Whether no actor has a profile yet.
    pub fn is_empty(&self) -> bool {
        self.profiles.lock().is_empty()
    }
}
