//! Deadline urgency scanner.
//!
//! # Responsibility
//! - Select open, visible items whose deadline falls within a horizon.
//! - Rank them by whole days remaining, most overdue first.
//!
//! # Invariants
//! - Results are recomputed on every call; "now" is an input, never cached.
//! - Day differences are taken between calendar dates, so time-of-day never
//!   shifts the count.
//! - Sorting is stable: equal `days_remaining` keep input order.

use crate::model::date::parse_calendar_date;
use crate::model::deadline::{DeadlineItem, ItemKind, UrgentEntry};
use crate::model::person::Actor;
use crate::service::session_registry::ScheduleError;
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

/// Default reminder horizon in days.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Who may see an item of a given kind in reminder lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPolicy {
    /// Every viewer sees the item.
    Everyone,
    /// Only the owner/assignee or a privileged viewer sees the item.
    OwnerOrPrivileged,
}

/// Per-kind visibility settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindVisibility {
    #[serde(default = "default_project_visibility")]
    pub project: VisibilityPolicy,
    #[serde(default = "default_task_visibility")]
    pub task: VisibilityPolicy,
}

fn default_project_visibility() -> VisibilityPolicy {
    VisibilityPolicy::Everyone
}

fn default_task_visibility() -> VisibilityPolicy {
    VisibilityPolicy::OwnerOrPrivileged
}

impl Default for KindVisibility {
    fn default() -> Self {
        Self {
            project: default_project_visibility(),
            task: default_task_visibility(),
        }
    }
}

impl KindVisibility {
    pub fn policy_for(&self, kind: ItemKind) -> VisibilityPolicy {
        match kind {
            ItemKind::Project => self.project,
            ItemKind::Task => self.task,
        }
    }

    pub fn is_visible(&self, item: &DeadlineItem, viewer_id: &str, privileged: bool) -> bool {
        match self.policy_for(item.kind) {
            VisibilityPolicy::Everyone => true,
            VisibilityPolicy::OwnerOrPrivileged => privileged || item.owner_id == viewer_id,
        }
    }
}

/// Signed whole days from `now` to `deadline`.
pub fn days_remaining(now: NaiveDate, deadline: NaiveDate) -> i64 {
    deadline.signed_duration_since(now).num_days()
}

/// Scans with the default per-kind visibility (projects ungated, tasks
/// gated to owner or privileged viewer).
pub fn scan(
    items: &[DeadlineItem],
    now: NaiveDate,
    horizon_days: u32,
    viewer_id: &str,
    viewer_is_privileged: bool,
) -> Vec<UrgentEntry> {
    scan_with_visibility(
        items,
        now,
        horizon_days,
        viewer_id,
        viewer_is_privileged,
        &KindVisibility::default(),
    )
}

/// Scans from a timestamp; the time-of-day part of `now` is discarded.
pub fn scan_at(
    items: &[DeadlineItem],
    now: NaiveDateTime,
    horizon_days: u32,
    viewer_id: &str,
    viewer_is_privileged: bool,
) -> Vec<UrgentEntry> {
    scan(items, now.date(), horizon_days, viewer_id, viewer_is_privileged)
}

/// Scan entry point for hosts holding the `YYYY-MM-DD` wire encoding of
/// `now`.
///
/// # Errors
/// - `ScheduleError::InvalidArgument` when `now` is malformed.
pub fn scan_str(
    items: &[DeadlineItem],
    now: &str,
    horizon_days: u32,
    viewer_id: &str,
    viewer_is_privileged: bool,
) -> Result<Vec<UrgentEntry>, ScheduleError> {
    let now = parse_calendar_date(now)?;
    Ok(scan(items, now, horizon_days, viewer_id, viewer_is_privileged))
}

/// Full scan with explicit per-kind visibility.
pub fn scan_with_visibility(
    items: &[DeadlineItem],
    now: NaiveDate,
    horizon_days: u32,
    viewer_id: &str,
    viewer_is_privileged: bool,
    visibility: &KindVisibility,
) -> Vec<UrgentEntry> {
    let horizon = i64::from(horizon_days);
    let mut entries: Vec<UrgentEntry> = items
        .iter()
        .filter(|item| !item.closed)
        .filter(|item| visibility.is_visible(item, viewer_id, viewer_is_privileged))
        .filter_map(|item| {
            let deadline = item.deadline?;
            let days = days_remaining(now, deadline);
            (days <= horizon).then(|| UrgentEntry {
                item: item.clone(),
                days_remaining: days,
                kind: item.kind,
            })
        })
        .collect();
    entries.sort_by_key(|entry| entry.days_remaining);

    debug!(
        "event=urgency_scan module=urgency status=ok items={} urgent={} horizon_days={}",
        items.len(),
        entries.len(),
        horizon_days
    );
    entries
}

/// Scanner bound to a horizon and visibility configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyScanner {
    pub horizon_days: u32,
    pub visibility: KindVisibility,
}

impl Default for UrgencyScanner {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON_DAYS, KindVisibility::default())
    }
}

impl UrgencyScanner {
    pub fn new(horizon_days: u32, visibility: KindVisibility) -> Self {
        Self {
            horizon_days,
            visibility,
        }
    }

    /// Urgent entries for `viewer`, privileged iff the viewer is an admin.
    pub fn scan(&self, items: &[DeadlineItem], now: NaiveDate, viewer: &Actor) -> Vec<UrgentEntry> {
        scan_with_visibility(
            items,
            now,
            self.horizon_days,
            &viewer.person_id,
            viewer.is_admin,
            &self.visibility,
        )
    }

    /// Reminder badge number. Must be recomputed whenever items or `now`
    /// change.
    pub fn badge_count(&self, items: &[DeadlineItem], now: NaiveDate, viewer: &Actor) -> usize {
        self.scan(items, now, viewer).len()
    }

    /// Visible open tasks whose deadline has already passed. Projects are
    /// not counted.
    pub fn overdue_count(&self, items: &[DeadlineItem], now: NaiveDate, viewer: &Actor) -> usize {
        items
            .iter()
            .filter(|item| item.kind == ItemKind::Task && !item.closed)
            .filter(|item| {
                self.visibility
                    .is_visible(item, &viewer.person_id, viewer.is_admin)
            })
            .filter_map(|item| item.deadline)
            .filter(|deadline| days_remaining(now, *deadline) < 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        days_remaining, scan, scan_at, scan_str, scan_with_visibility, KindVisibility,
        UrgencyScanner, VisibilityPolicy,
    };
    use crate::service::session_registry::ScheduleError;
    use crate::model::deadline::{DeadlineItem, ItemKind};
    use crate::model::person::Actor;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item(id: &str, kind: ItemKind, owner: &str, deadline: Option<NaiveDate>) -> DeadlineItem {
        DeadlineItem {
            id: id.to_string(),
            label: format!("label {id}"),
            deadline,
            closed: false,
            owner_id: owner.to_string(),
            kind,
        }
    }

    #[test]
    fn days_remaining_is_signed() {
        assert_eq!(days_remaining(date(2024, 3, 1), date(2024, 3, 8)), 7);
        assert_eq!(days_remaining(date(2024, 3, 1), date(2024, 2, 20)), -10);
        assert_eq!(days_remaining(date(2023, 3, 1), date(2023, 2, 20)), -9);
        assert_eq!(days_remaining(date(2024, 3, 1), date(2024, 3, 1)), 0);
    }

    #[test]
    fn zero_horizon_keeps_only_today_and_overdue() {
        let now = date(2024, 3, 1);
        let items = vec![
            item("tomorrow", ItemKind::Project, "u2", Some(date(2024, 3, 2))),
            item("today", ItemKind::Project, "u2", Some(now)),
            item("late", ItemKind::Project, "u2", Some(date(2024, 2, 28))),
        ];
        let ids: Vec<String> = scan(&items, now, 0, "u9", false)
            .into_iter()
            .map(|entry| entry.item.id)
            .collect();
        assert_eq!(ids, vec!["late".to_string(), "today".to_string()]);
    }

    #[test]
    fn items_without_deadline_are_never_urgent() {
        let items = vec![item("none", ItemKind::Project, "u2", None)];
        assert!(scan(&items, date(2024, 3, 1), 365, "u2", true).is_empty());
    }

    #[test]
    fn scan_at_truncates_time_of_day() {
        let now = date(2024, 3, 1).and_hms_opt(23, 59, 0).unwrap();
        let items = vec![item("p", ItemKind::Project, "u2", Some(date(2024, 3, 8)))];
        let entries = scan_at(&items, now, 7, "u2", false);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].days_remaining, 7);
    }

    #[test]
    fn task_visibility_is_gated_by_default() {
        let now = date(2024, 3, 1);
        let items = vec![item("t", ItemKind::Task, "u3", Some(now))];
        assert!(scan(&items, now, 7, "u2", false).is_empty());
        assert_eq!(scan(&items, now, 7, "u3", false).len(), 1);
        assert_eq!(scan(&items, now, 7, "u1", true).len(), 1);
    }

    #[test]
    fn project_visibility_can_be_gated_too() {
        let now = date(2024, 3, 1);
        let items = vec![item("p", ItemKind::Project, "u2", Some(now))];
        let gated = KindVisibility {
            project: VisibilityPolicy::OwnerOrPrivileged,
            task: VisibilityPolicy::OwnerOrPrivileged,
        };
        assert!(scan_with_visibility(&items, now, 7, "u3", false, &gated).is_empty());
        assert_eq!(scan(&items, now, 7, "u3", false).len(), 1);
    }

    #[test]
    fn scanner_counts_badge_and_overdue() {
        let now = date(2024, 3, 1);
        let mut done = item("done", ItemKind::Task, "u3", Some(date(2024, 2, 1)));
        done.closed = true;
        let items = vec![
            item("late", ItemKind::Task, "u3", Some(date(2024, 2, 27))),
            item("soon", ItemKind::Project, "u2", Some(date(2024, 3, 5))),
            item("later", ItemKind::Project, "u2", Some(date(2024, 4, 1))),
            item("slipped", ItemKind::Project, "u2", Some(date(2024, 2, 20))),
            done,
        ];
        let scanner = UrgencyScanner::default();
        let viewer = Actor::new("u3", false);

        assert_eq!(scanner.badge_count(&items, now, &viewer), 3);
        assert_eq!(scanner.overdue_count(&items, now, &viewer), 1);
        assert_eq!(scanner.overdue_count(&items, now, &Actor::new("u2", false)), 0);
        assert_eq!(scanner.overdue_count(&items, now, &Actor::new("u1", true)), 1);
    }

    #[test]
    fn string_now_is_parsed_strictly() {
        let items = vec![item("p", ItemKind::Project, "u2", Some(date(2024, 3, 8)))];

        let entries = scan_str(&items, "2024-03-01", 7, "u2", false).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].days_remaining, 7);

        for bad in ["", "01/03/2024", "2024-3-1", "2024-02-30", "2024-03-01T10:00:00"] {
            assert!(
                matches!(
                    scan_str(&items, bad, 7, "u2", false),
                    Err(ScheduleError::InvalidArgument(_))
                ),
                "accepted `{bad}`"
            );
        }
    }
}
