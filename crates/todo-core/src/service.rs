//! Todo service: validation and ownership on top of a [`TodoRepository`].
//!
//! `owner` is `None` when authentication is disabled (all todos are shared)
//! and `Some(user_id)` otherwise. With an owner, every single-record
//! operation first loads the row and fails with [`TodoError::Forbidden`] when
//! it belongs to somebody else.

use crate::error::TodoError;
use crate::model::{NewTodo, Todo, TodoId, TodoPatch};
use crate::repository::TodoRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, owner: Option<&str>) -> Result<Vec<Todo>, TodoError> {
        Ok(self.repo.list(owner).await?)
    }

    pub async fn create(&self, owner: Option<&str>, input: NewTodo) -> Result<Todo, TodoError> {
        let title = validate_title(&input.title)?;
        let input = NewTodo {
            title,
            completed: input.completed,
        };

        let todo = self.repo.insert(owner, &input).await?;
        tracing::info!(todo_id = todo.id, owner = owner.unwrap_or("-"), "todo created");
        Ok(todo)
    }

    pub async fn get(&self, id: TodoId, owner: Option<&str>) -> Result<Todo, TodoError> {
        let todo = self.repo.find(id).await?.ok_or(TodoError::NotFound(id))?;
        if !todo.is_visible_to(owner) {
            tracing::warn!(todo_id = id, owner = owner.unwrap_or("-"), "access to foreign todo denied");
            return Err(TodoError::Forbidden(id));
        }
        Ok(todo)
    }

    pub async fn update(
        &self,
        id: TodoId,
        owner: Option<&str>,
        patch: TodoPatch,
    ) -> Result<Todo, TodoError> {
        let current = self.get(id, owner).await?;
        let patch = TodoPatch {
            title: patch.title.as_deref().map(validate_title).transpose()?,
            completed: patch.completed,
        };
        if patch.is_empty() {
            return Ok(current);
        }

        let todo = self
            .repo
            .update(id, &patch)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tracing::info!(todo_id = id, completed = todo.completed, "todo updated");
        Ok(todo)
    }

    pub async fn delete(&self, id: TodoId, owner: Option<&str>) -> Result<(), TodoError> {
        self.get(id, owner).await?;
        if !self.repo.delete(id).await? {
            return Err(TodoError::NotFound(id));
        }
        tracing::info!(todo_id = id, "todo deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String, TodoError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TodoError::Validation("title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
