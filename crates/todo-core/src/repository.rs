use crate::model::{NewTodo, NewUser, Todo, TodoId, TodoPatch, User};
use async_trait::async_trait;

/// Storage for todo records.
///
/// Implementations do not enforce ownership; that is the service's job.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All todos in creation order, restricted to `owner` when given.
    async fn list(&self, owner: Option<&str>) -> anyhow::Result<Vec<Todo>>;

    /// Insert a todo. `input.title` is already validated.
    async fn insert(&self, owner: Option<&str>, input: &NewTodo) -> anyhow::Result<Todo>;

    async fn find(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;

    /// Apply a partial update; `None` when the row vanished.
    async fn update(&self, id: TodoId, patch: &TodoPatch) -> anyhow::Result<Option<Todo>>;

    /// Delete a todo; `false` when nothing was removed.
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}

/// Storage for users created through OAuth login.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: &str) -> anyhow::Result<Option<User>>;

    /// Insert the user, or overwrite name and email when the id already
    /// exists. Concurrent first logins for one subject both succeed.
    async fn upsert_user(&self, profile: &NewUser) -> anyhow::Result<User>;

    /// Overwrite name and email for an existing user.
    async fn refresh_profile(&self, profile: &NewUser) -> anyhow::Result<User>;
}
