//! Process-local storage.
//!
//! Backs `database.backend = "memory"` and the test suites. Data is lost on
//! restart.

use crate::model::{NewTodo, NewUser, Todo, TodoId, TodoPatch, User};
use crate::repository::{TodoRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    todos: BTreeMap<TodoId, Todo>,
    last_id: TodoId,
    users: HashMap<String, User>,
}

/// In-memory implementation of both repository traits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for MemoryStore {
    async fn list(&self, owner: Option<&str>) -> anyhow::Result<Vec<Todo>> {
        let tables = self.tables.read().await;
        // BTreeMap iterates in id order, which is creation order.
        Ok(tables
            .todos
            .values()
            .filter(|t| owner.is_none() || t.owner_id.as_deref() == owner)
            .cloned()
            .collect())
    }

    async fn insert(&self, owner: Option<&str>, input: &NewTodo) -> anyhow::Result<Todo> {
        let mut tables = self.tables.write().await;
        tables.last_id += 1;
        let todo = Todo {
            id: tables.last_id,
            title: input.title.clone(),
            completed: input.completed,
            owner_id: owner.map(str::to_string),
            created_at: Utc::now(),
        };
        tables.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find(&self, id: TodoId) -> anyhow::Result<Option<Todo>> {
        Ok(self.tables.read().await.todos.get(&id).cloned())
    }

    async fn update(&self, id: TodoId, patch: &TodoPatch) -> anyhow::Result<Option<Todo>> {
        let mut tables = self.tables.write().await;
        let Some(todo) = tables.todos.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &patch.title {
            todo.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: TodoId) -> anyhow::Result<bool> {
        Ok(self.tables.write().await.todos.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn upsert_user(&self, profile: &NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let user = tables
            .users
            .entry(profile.id.clone())
            .and_modify(|u| {
                u.name = profile.name.clone();
                u.email = profile.email.clone();
                u.updated_at = now;
            })
            .or_insert_with(|| User {
                id: profile.id.clone(),
                name: profile.name.clone(),
                email: profile.email.clone(),
                created_at: now,
                updated_at: now,
            });
        Ok(user.clone())
    }

    async fn refresh_profile(&self, profile: &NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&profile.id)
            .ok_or_else(|| anyhow::anyhow!("user '{}' does not exist", profile.id))?;
        user.name = profile.name.clone();
        user.email = profile.email.clone();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}
