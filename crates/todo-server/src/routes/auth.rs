use crate::error::ApiError;
use crate::middleware::auth::VerifiedSession;
use crate::state::AppState;
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use todo_auth::AuthError;
use todo_core::User;

/// 302 to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub async fn begin_login(State(state): State<AppState>) -> Result<Response, ApiError> {
    let url = state.require_auth()?.begin_login()?;
    Ok(found(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    /// Set by the provider when the user denies consent.
    #[serde(default)]
    error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(q): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let auth = state.require_auth()?;

    if let Some(error) = q.error {
        tracing::info!(%error, "provider returned an error to the callback");
        return Err(AuthError::InvalidGrant(error).into());
    }
    let code = q
        .code
        .ok_or_else(|| AuthError::InvalidGrant("missing authorization code".to_string()))?;

    let grant = auth.handle_callback(&code, q.state.as_deref()).await?;
    Ok(found(auth.frontend_redirect(&grant.token).as_str()))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<VerifiedSession>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.require_auth()?.current_user(&session.user_id).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<VerifiedSession>,
) -> Result<StatusCode, ApiError> {
    state
        .require_auth()?
        .logout(&session.user_id, &session.session_id);
    Ok(StatusCode::NO_CONTENT)
}
