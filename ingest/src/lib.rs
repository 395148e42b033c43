//! Batch ingestion of Crossref work metadata into PostgreSQL.
//!
//! One run fetches a bounded batch of works from the paginated Crossref API,
//! normalizes each raw item into a flat [`record::CanonicalWork`], drops
//! duplicate DOIs, and loads the result with insert-or-skip semantics.

pub mod config;
pub mod dedup;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod source;
