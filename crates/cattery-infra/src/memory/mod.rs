//! In-memory repositories - used as fallback when PostgreSQL is unavailable.
//!
//! Data is lost on process restart.

mod store;

pub use store::{InMemoryAdoptions, InMemoryCats, InMemorySessions, InMemoryStore, InMemoryUsers};
