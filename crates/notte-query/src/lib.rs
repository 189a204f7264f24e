//! Fuzzy query resolution for Notte.
//!
//! A [`QueryBuilder`] turns an entity store into a [`FuzzyIndex`] of
//! lowercase keys; a [`Resolver`] serves the current index and swaps in
//! rebuilt ones; [`scan`] answers `[[term]]` queries found in messages.

pub mod builder;
pub mod error;
pub mod index;
pub mod payload;
pub mod resolver;
pub mod scan;

pub use builder::{AliasProvider, NoAliases, QueryBuilder, build_index};
pub use error::{QueryError, QueryResult};
pub use index::{FuzzyIndex, Match, Payload, Resolved, threshold};
pub use payload::QueryPayload;
pub use resolver::Resolver;
pub use scan::{SpecialQuery, answer_queries, describe_matches, extract_queries};
