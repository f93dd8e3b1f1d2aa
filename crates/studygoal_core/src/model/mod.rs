//! Domain model for study subjects and goals.
//!
//! # Responsibility
//! - Define the canonical records owned by the data store.
//! - Allocate identifiers for newly created records.
//!
//! # Invariants
//! - Every record is identified by an opaque id that is never reassigned.
//! - Goals reference subjects by name, never by id.

pub mod goal;
pub mod id;
pub mod subject;
pub mod user;
