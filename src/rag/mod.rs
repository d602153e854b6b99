//! Embedded SQLite store backing the clinic application's retrieval.

pub mod query;
pub mod store;

pub use query::{QueryHelper, SearchHit};
pub use store::{RagStore, StoreStatus};
