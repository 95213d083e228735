//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract for the forageables catalogue.
//! - Isolate SQLite query details from the presentation adapter.
//! - Provide a shared, change-notifying store handle for reactive reads.
//!
//! # Invariants
//! - Insert conflicts on an existing identifier are resolved by full-record
//!   replacement, never by rejection.
//! - Point lookups on absent rows yield `None`, not an error.

pub mod forageable_repo;
pub mod store;
