use crate::error::ApiError;
use crate::middleware::auth::Caller;
use crate::state::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use todo_core::{NewTodo, Todo, TodoId, TodoPatch};

pub async fn list_todos(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.todos().list(caller.owner()).await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = payload?;
    let todo = state.todos().create(caller.owner(), input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.todos().get(id, caller.owner()).await?))
}

pub async fn update_todo(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<TodoId>, PathRejection>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(state.todos().update(id, caller.owner(), patch).await?))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    caller: Caller,
    id: Result<Path<TodoId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.todos().delete(id, caller.owner()).await?;
    Ok(StatusCode::NO_CONTENT)
}
