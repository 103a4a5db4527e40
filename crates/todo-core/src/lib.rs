//! # todo-core
//!
//! Shared building blocks for the todo service:
//! - domain records (`Todo`, `User`) and their input shapes
//! - the error taxonomy surfaced by the service layer
//! - configuration loaded from `config.toml`
//! - repository traits implemented by the storage adapters
//! - `TodoService`, which enforces validation and ownership rules
//!
//! Storage lives behind [`TodoRepository`] / [`UserRepository`]. The
//! Postgres adapter is in `todo-adapter-pg`; [`MemoryStore`] is a process-local
//! implementation used for development and tests.

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod repository;
pub mod service;

pub use config::{AppConfig, AuthConfig, AuthMode, DatabaseConfig, GoogleConfig, ServerConfig, StorageBackend};
pub use error::TodoError;
pub use memory::MemoryStore;
pub use model::{NewTodo, NewUser, Todo, TodoId, TodoPatch, User};
pub use repository::{TodoRepository, UserRepository};
pub use service::TodoService;
