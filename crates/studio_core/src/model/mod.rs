//! Domain model for the studio work schedule and deadline reminders.
//!
//! # Responsibility
//! - Define the registration record and its half-day state algebra.
//! - Define roster entries and the acting identity.
//! - Define deadline-bearing item shapes and their uniform projection.
//!
//! # Invariants
//! - Calendar dates never carry a time-of-day component.
//! - OFF is represented by the absence of a registration.

pub mod date;
pub mod deadline;
pub mod person;
pub mod registration;
