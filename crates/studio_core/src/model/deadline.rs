//! Deadline-bearing items: source shapes and their uniform projection.
//!
//! # Responsibility
//! - Define the project and task shapes the host owns.
//! - Adapt each kind once, at the boundary, into `DeadlineItem`.
//!
//! # Invariants
//! - `DeadlineItem::closed` is derived from the kind's own terminal-status
//!   vocabulary; the scanner never inspects source statuses.
//! - Items are read-only inputs; nothing here mutates them.

use crate::model::date::serde_date_opt;
use crate::model::registration::PersonId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Discriminates the two deadline-bearing kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Project,
    Task,
}

/// Project lifecycle status. Localized legacy labels are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[serde(alias = "Khởi tạo")]
    Init,
    #[serde(alias = "Đang thiết kế")]
    Designing,
    #[serde(alias = "Chờ duyệt")]
    WaitingApproval,
    #[serde(alias = "Đang thi công")]
    Constructing,
    #[serde(alias = "Hoàn thành")]
    Completed,
    #[serde(alias = "Lưu trữ")]
    Archived,
}

impl ProjectStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Archived)
    }
}

/// Task lifecycle status. Localized legacy labels are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[serde(alias = "Mới")]
    New,
    #[serde(alias = "Đang thực hiện")]
    InProgress,
    #[serde(alias = "Chờ phản hồi")]
    WaitingFeedback,
    #[serde(alias = "Cần chỉnh sửa")]
    NeedRevision,
    #[serde(alias = "Đã duyệt")]
    Approved,
    #[serde(alias = "Hoàn thành")]
    Done,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Done)
    }
}

/// Host-owned project shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub name: String,
    pub pm_id: PersonId,
    #[serde(default, with = "serde_date_opt")]
    pub deadline: Option<NaiveDate>,
    pub status: ProjectStatus,
}

/// Host-owned task shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    pub title: String,
    pub assignee_id: PersonId,
    #[serde(default, with = "serde_date_opt")]
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
}

/// Uniform projection consumed by the urgency scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlineItem {
    pub id: String,
    pub label: String,
    /// `None` means the item is never urgent.
    pub deadline: Option<NaiveDate>,
    pub closed: bool,
    pub owner_id: PersonId,
    pub kind: ItemKind,
}

impl From<&Project> for DeadlineItem {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            label: project.name.clone(),
            deadline: project.deadline,
            closed: project.status.is_terminal(),
            owner_id: project.pm_id.clone(),
            kind: ItemKind::Project,
        }
    }
}

impl From<&Task> for DeadlineItem {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            label: task.title.clone(),
            deadline: task.deadline,
            closed: task.status.is_terminal(),
            owner_id: task.assignee_id.clone(),
            kind: ItemKind::Task,
        }
    }
}

/// Adapts both source collections into one item list, projects first.
pub fn collect_deadline_items(projects: &[Project], tasks: &[Task]) -> Vec<DeadlineItem> {
    projects
        .iter()
        .map(DeadlineItem::from)
        .chain(tasks.iter().map(DeadlineItem::from))
        .collect()
}

/// Derived reminder entry. Recomputed on every scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrgentEntry {
    pub item: DeadlineItem,
    /// Whole days until the deadline; negative when overdue.
    pub days_remaining: i64,
    pub kind: ItemKind,
}

impl UrgentEntry {
    pub fn is_overdue(&self) -> bool {
        self.days_remaining < 0
    }
}
