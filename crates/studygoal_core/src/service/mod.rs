//! Use-case orchestration over repositories and storage.
//!
//! # Responsibility
//! - Expose the single read/write surface callers use.
//! - Keep callers decoupled from repository and adapter details.

pub mod data_store;
