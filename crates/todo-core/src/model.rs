//! Domain records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned todo identifier (`BIGSERIAL` in Postgres).
pub type TodoId = i64;

/// A todo item.
///
/// Only `id`, `title` and `completed` go over the wire; the owner and the
/// creation timestamp stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    #[serde(skip)]
    pub owner_id: Option<String>,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Whether `owner` may see or mutate this todo.
    ///
    /// `None` means auth is disabled and every todo is shared.
    pub fn is_visible_to(&self, owner: Option<&str>) -> bool {
        match owner {
            None => true,
            Some(caller) => self.owner_id.as_deref() == Some(caller),
        }
    }
}

/// Input for creating a todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// Partial update. Fields left as `None` are preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// A user known to the service, keyed by the identity provider's subject id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// Profile fields used to create or refresh a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// True when the stored profile differs from a freshly fetched one.
    pub fn profile_differs(&self, profile: &NewUser) -> bool {
        self.name != profile.name || self.email != profile.email
    }
}
