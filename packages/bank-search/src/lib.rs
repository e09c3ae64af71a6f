//! Query construction and submission for the bank search index.

mod error;

pub mod client;
pub mod query;

pub use client::SearchClient;
pub use error::{Error, Result};
pub use query::SearchQuery;

/// A single search hit, forwarded without a fixed schema.
pub type Hit = serde_json::Value;

pub const STATE_FIELD: &str = "state";
pub const EMPLOYER_FIELD: &str = "employer";
