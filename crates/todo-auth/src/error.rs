//! Error types for the auth crate.

use thiserror::Error;

/// Errors that can occur during login or token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Session token is past its expiry.
    #[error("session token has expired")]
    TokenExpired,

    /// Session token is malformed, forged or of the wrong kind.
    #[error("invalid session token: {0}")]
    TokenInvalid(String),

    /// The identity provider could not be reached or failed.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider rejected the authorization code, or the callback was
    /// malformed.
    #[error("invalid grant: {0}")]
    InvalidGrant(String),

    /// Auth settings are unusable.
    #[error("auth configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
