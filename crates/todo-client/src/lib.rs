//! # todo-client
//!
//! Client side of the todo service.
//!
//! - [`TodoApi`] wraps every HTTP route.
//! - [`TodoBoard`] is the list screen's state and its handlers.
//! - [`AuthContext`] tracks the signed-in user and the session token.

pub mod api;
pub mod auth;
pub mod board;
pub mod error;
mod loading;

pub use api::TodoApi;
pub use auth::AuthContext;
pub use board::TodoBoard;
pub use error::ClientError;
