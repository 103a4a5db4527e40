//! # todo-auth
//!
//! Login and session handling for the todo server.
//!
//! - [`IdentityProvider`] abstracts the OAuth 2.0 provider; [`GoogleProvider`]
//!   talks to Google's consent, token and userinfo endpoints.
//! - [`SessionManager`] issues and verifies HS256 JWT session tokens. Sessions
//!   are stateless: a token is valid iff its signature and expiry check out.
//! - [`AuthService`] ties the two together with user storage: it resolves the
//!   provider profile to a local user (creating it on first login) and mints
//!   the session token returned to the browser.

pub mod error;
pub mod google;
pub mod provider;
pub mod service;
pub mod session;

pub use error::AuthError;
pub use google::GoogleProvider;
pub use provider::{IdentityProvider, ProviderProfile};
pub use service::AuthService;
pub use session::{SessionClaims, SessionGrant, SessionManager};
