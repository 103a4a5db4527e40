//! # todo-server
//!
//! HTTP API for the todo service.
//!
//! The router maps each route onto [`todo_core::TodoService`] or
//! [`todo_auth::AuthService`], turns their errors into status codes with a
//! `{"detail": ...}` body and serializes results as JSON. With
//! `auth.mode = "google"`, the todo routes and `/api/auth/{me,logout}` sit
//! behind the bearer-token middleware in [`middleware::auth`].

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
