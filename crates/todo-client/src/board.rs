//! State behind the todo list screen.

use crate::api::TodoApi;
use crate::loading::LoadingGuard;
use todo_core::{NewTodo, Todo, TodoId, TodoPatch};

/// Snapshot of the list screen: the todos, the new-todo input and whether a
/// create request is in flight.
///
/// Handlers never surface errors; a failed request is logged and the
/// snapshot is left as it was.
#[derive(Debug)]
pub struct TodoBoard {
    api: TodoApi,
    pub todos: Vec<Todo>,
    pub input: String,
    pub loading: bool,
}

impl TodoBoard {
    pub fn new(api: TodoApi) -> Self {
        Self {
            api,
            todos: Vec::new(),
            input: String::new(),
            loading: false,
        }
    }

    pub fn api(&self) -> &TodoApi {
        &self.api
    }

    /// Fetch the full list, replacing the local snapshot.
    pub async fn load(&mut self) {
        match self.api.list_todos().await {
            Ok(todos) => self.todos = todos,
            Err(e) => tracing::error!(error = %e, "failed to load todos"),
        }
    }

    /// Create a todo from `input`.
    ///
    /// Blank input is ignored, as is a call made while a previous create is
    /// still marked as loading.
    pub async fn add(&mut self) {
        if self.loading || self.input.trim().is_empty() {
            return;
        }

        let input = NewTodo::new(self.input.trim());
        let _loading = LoadingGuard::set(&mut self.loading);
        match self.api.create_todo(&input).await {
            Ok(todo) => {
                self.todos.push(todo);
                self.input.clear();
            }
            Err(e) => tracing::error!(error = %e, "failed to add todo"),
        }
    }

    /// Flip `completed` on the server and take its copy of the record.
    pub async fn toggle(&mut self, id: TodoId) {
        let Some(pos) = self.todos.iter().position(|t| t.id == id) else {
            tracing::warn!(id, "toggle for a todo that isn't on the board");
            return;
        };
        let patch = TodoPatch {
            title: None,
            completed: Some(!self.todos[pos].completed),
        };
        match self.api.update_todo(id, &patch).await {
            Ok(updated) => self.todos[pos] = updated,
            Err(e) => tracing::error!(id, error = %e, "failed to toggle todo"),
        }
    }

    pub async fn delete(&mut self, id: TodoId) {
        match self.api.delete_todo(id).await {
            Ok(()) => self.todos.retain(|t| t.id != id),
            Err(e) => tracing::error!(id, error = %e, "failed to delete todo"),
        }
    }

    /// Number of todos not yet completed.
    pub fn remaining(&self) -> usize {
        self.todos.iter().filter(|t| !t.completed).count()
    }
}
