//! Presentation-facing use-case services.
//!
//! # Responsibility
//! - Adapt repository snapshots into observable state for a UI layer.
//! - Keep UI callers decoupled from storage and scheduling details.

pub mod forageable_service;
