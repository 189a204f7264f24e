//! Core types for Notte: game entities, typed data rows, and embed view models.
//!
//! Entity data is read from per-category JSON tables into an
//! [`EntityStore`]. Every entity implements [`Entity`], which renders it to a
//! platform-neutral [`Embed`]. Nothing in this crate performs network I/O.

/// Platform-neutral rich message view models.
pub mod embed;
/// Entity categories, shared enums, and the [`Entity`] trait.
pub mod entity;
/// Wyrmprints and weapons.
pub mod equipment;
/// Error types used throughout the crate.
pub mod error;
/// Skills and abilities.
pub mod feature;
/// Typed field parsing for raw data rows.
pub mod row;
/// Summon showcases.
pub mod showcase;
/// The entity repository.
pub mod store;
/// Markup cleanup and list formatting.
pub mod text;
/// Adventurers and dragons.
pub mod unit;

pub use embed::{Embed, EmbedField, Message};
pub use entity::{Availability, Element, Entity, EntityKind, EntityRef, WeaponType};
pub use equipment::{Weapon, Wyrmprint};
pub use error::{CoreError, CoreResult};
pub use feature::{Ability, Skill};
pub use showcase::Showcase;
pub use store::EntityStore;
pub use unit::{Adventurer, Dragon};
