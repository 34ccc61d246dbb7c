//! Core use-case services.
//!
//! # Responsibility
//! - Apply schedule edits and derive grid, headcount and reminder views.
//! - Keep host/UI layers decoupled from storage details.
//!
//! # Invariants
//! - Registry and scanner functions are pure; only `ScheduleDraft::commit`
//!   touches a repository.

pub mod schedule_draft;
pub mod session_registry;
pub mod urgency_scanner;
pub mod week_view;
