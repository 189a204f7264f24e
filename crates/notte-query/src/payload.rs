//! Query payloads: what a resolved key answers with.

use notte_core::{Embed, Entity, EntityRef};

use crate::index::Payload;

/// What a query key answers with.
#[derive(Debug, Clone)]
pub enum QueryPayload {
    /// An entity, rendered on demand.
    Entity(EntityRef),
    /// A prebuilt card, e.g. a disambiguation list.
    Embed(Embed),
}

impl QueryPayload {
    /// The card to show for this payload.
    pub fn render(&self) -> Embed {
        match self {
            Self::Entity(e) => e.render(),
            Self::Embed(e) => e.clone(),
        }
    }
}

impl Payload for QueryPayload {
    fn is_empty(&self) -> bool {
        match self {
            Self::Entity(_) => false,
            Self::Embed(e) => e.is_empty(),
        }
    }
}

impl From<EntityRef> for QueryPayload {
    fn from(e: EntityRef) -> Self {
        Self::Entity(e)
    }
}

impl From<Embed> for QueryPayload {
    fn from(e: Embed) -> Self {
        Self::Embed(e)
    }
}
