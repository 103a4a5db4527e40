use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use std::convert::Infallible;

#[derive(Clone, Debug)]
pub struct VerifiedSession {
    pub user_id: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Axum middleware guarding protected routes:
/// - read `Authorization: Bearer <token>`
/// - verify signature and expiry
/// - expose the caller as a [`VerifiedSession`] extension
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = state.require_auth()?;
    let token = extract_bearer(req.headers()).ok_or(ApiError::MissingToken)?;

    let claims = auth.verify(&token).inspect_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "session rejected");
    })?;

    req.extensions_mut().insert(VerifiedSession {
        expires_at: claims.expires_at(),
        user_id: claims.sub,
        session_id: claims.jti,
    });

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    let rest = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if rest.is_empty() {
        return None;
    }
    Some(rest.to_string())
}

/// The caller of a todo route.
///
/// Holds the verified session when auth is enabled; empty when it's disabled,
/// in which case todos are not scoped to anyone.
#[derive(Clone, Debug, Default)]
pub struct Caller(pub Option<VerifiedSession>);

impl Caller {
    pub fn owner(&self) -> Option<&str> {
        self.0.as_ref().map(|s| s.user_id.as_str())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<VerifiedSession>().cloned()))
    }
}
