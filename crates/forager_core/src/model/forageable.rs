//! Forageable domain model.
//!
//! # Responsibility
//! - Define the single catalogued record: a named foraging location.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on insert.
//! - Once assigned, `id` is unique and immutable for the record's lifetime.
//! - All other fields are freely replaceable via full-record updates.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a persisted forageable.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ForageableId = i64;

/// A single catalogued foraging location.
///
/// There are no relationships to other records and no tombstone state;
/// deletion is a hard removal keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forageable {
    /// `None` for a record that has not been persisted yet.
    pub id: Option<ForageableId>,
    /// Display name. Also the key for exact-match name lookups.
    pub name: String,
    /// Where the location is.
    pub address: String,
    /// Whether the forageable is currently in season.
    pub in_season: bool,
    /// Free-form notes.
    pub notes: String,
}

impl Forageable {
    /// Creates a not-yet-persisted record; the store assigns the id on insert.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        in_season: bool,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            address: address.into(),
            in_season,
            notes: notes.into(),
        }
    }

    /// Creates a record carrying an already-assigned identifier.
    ///
    /// Used by full-record replacement paths where identity already exists.
    pub fn with_id(
        id: ForageableId,
        name: impl Into<String>,
        address: impl Into<String>,
        in_season: bool,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name, address, in_season, notes)
        }
    }

    /// Returns whether this record has been assigned a store identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
