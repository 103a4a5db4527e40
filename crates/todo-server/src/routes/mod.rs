//! Route definitions.

pub mod auth;
pub mod todos;

use crate::middleware::auth::require_session;
use crate::state::AppState;
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use todo_core::ServerConfig;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Auth routes are only mounted when the state carries an auth service; in
/// that case the todo routes require a session too.
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let mut protected = Router::new()
        .route("/api/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/api/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        );

    let mut public = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz));

    if state.auth().is_some() {
        protected = protected
            .route("/api/auth/me", get(auth::me))
            .route("/api/auth/logout", post(auth::logout))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_session));
        public = public
            .route("/api/auth/google", get(auth::begin_login))
            .route("/api/auth/google/callback", get(auth::callback));
    }

    public
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(server)),
        )
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Todo API is running" }))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "todo-server" }))
}
