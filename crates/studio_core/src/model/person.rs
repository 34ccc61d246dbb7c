//! Roster model: people who can be scheduled and the acting viewer.

use crate::model::registration::PersonId;
use serde::{Deserialize, Serialize};

/// Studio role carried by every roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Studio owner; administers every schedule.
    Owner,
    /// Project manager.
    Pm,
    Designer,
    /// External viewer (client). Never scheduled.
    Viewer,
}

/// One roster entry supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub role: Role,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// Administrators may edit any schedule and see every task.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Owner
    }

    /// Returns `false` for pure external viewers.
    pub fn is_schedulable(&self) -> bool {
        self.role != Role::Viewer
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.is_admin())
    }
}

/// The identity performing a write or viewing a derived list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub person_id: PersonId,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(person_id: impl Into<PersonId>, is_admin: bool) -> Self {
        Self {
            person_id: person_id.into(),
            is_admin,
        }
    }

    pub fn can_write_for(&self, person_id: &str) -> bool {
        can_write(person_id, &self.person_id, self.is_admin)
    }
}

impl From<&Person> for Actor {
    fn from(value: &Person) -> Self {
        value.actor()
    }
}

/// Owner-or-admin write policy shared by every schedule mutation.
pub fn can_write(person_id: &str, acting_person_id: &str, is_admin: bool) -> bool {
    is_admin || acting_person_id == person_id
}

/// Filters a roster down to schedulable staff, keeping input order.
pub fn schedulable_roster(roster: &[Person]) -> Vec<&Person> {
    roster.iter().filter(|person| person.is_schedulable()).collect()
}
