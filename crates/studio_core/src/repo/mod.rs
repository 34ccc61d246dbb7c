//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the snapshot store contract for registrations.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes validate the whole collection before persistence.
//! - Repository APIs return semantic errors (`StaleWrite`) in addition to
//!   DB transport errors.

pub mod registration_repo;
