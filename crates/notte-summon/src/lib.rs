//! Summon simulator for Notte.
//!
//! Banners are built from showcases in the entity store. Each pull draws
//! from a [`RateTable`] computed from the banner and the actor's
//! [`PityState`]; the [`SummonService`] keeps one profile per actor.

pub mod banner;
pub mod error;
pub mod pity;
pub mod rates;
pub mod session;
pub mod showcase;
pub mod store;

pub use banner::{Banner, MULTI_PULL_SIZE, Summoned};
pub use error::{SummonError, SummonResult};
pub use pity::{PULLS_PER_STEP, PityState, RATE_PER_STEP};
pub use rates::{Bucket, Category, LOW_RARITY, MID_RARITY, RARITIES, RateTable, TOP_RARITY};
pub use session::SummonService;
pub use showcase::{GENERIC_SHOWCASE, ShowcaseCatalog, SummonShowcase};
pub use store::{ActorKey, PityStore, SummonProfile};
