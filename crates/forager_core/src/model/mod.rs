//! Domain model for the foraging catalogue.
//!
//! # Responsibility
//! - Define the canonical record persisted and displayed by the app.
//!
//! # Invariants
//! - A persisted record always carries a store-assigned integer identifier.
//! - Identifiers are never reused or reassigned.

pub mod forageable;
