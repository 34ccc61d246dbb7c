//! Core scheduling logic for the studio work planner.
//! Owns the half-day registration grid and deadline reminder rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_with, logging_status, LoggingError};
pub use model::date::{format_calendar_date, parse_calendar_date, DateParseError};
pub use model::deadline::{
    collect_deadline_items, DeadlineItem, ItemKind, Project, ProjectStatus, Task, TaskStatus,
    UrgentEntry,
};
pub use model::person::{schedulable_roster, Actor, Person, Role};
pub use model::registration::{
    normalize_registrations, validate_registrations, HalfDay, Headcount, PersonId, Registration,
    RegistrationId, RegistrationValidationError, SessionStatus, WorkSession,
};
pub use repo::registration_repo::{
    InMemoryRegistrationRepository, RegistrationRepository, RegistrationSnapshot, RepoError,
    RepoResult, SqliteRegistrationRepository,
};
pub use service::schedule_draft::ScheduleDraft;
pub use service::session_registry::{
    can_write, headcount, registration_for, session_status, toggle_half_day, toggle_half_day_str,
    try_toggle_half_day, ScheduleError,
};
pub use service::urgency_scanner::{
    days_remaining, scan, scan_at, scan_str, scan_with_visibility, KindVisibility,
    UrgencyScanner, VisibilityPolicy,
};
pub use service::week_view::{shift_weeks, week_days, week_start, WeekGrid, WeekRow};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
