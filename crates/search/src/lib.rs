//! Route-aware retrieval of indexed code fragments.
//!
//! A query is first constrained to fragments whose `route_hint` equals the
//! route's normalized path; when that yields nothing the same query runs over
//! the whole collection.

mod error;
mod query;
mod retrieval;

pub use error::{Result, SearchError};
pub use query::build_query_text;
pub use retrieval::{normalize_route_path, CodeRetriever, RetrievedFragment};
