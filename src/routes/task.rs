use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::auth::CurrentUser;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::extract::{JsonBody, PathParam};
use crate::types::{Task, request, response};

#[instrument(skip(state, user, params), fields(user_id = user.id))]
pub(crate) async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    JsonBody(params): JsonBody<request::CreateTaskData>,
) -> Result<(StatusCode, Json<Task>), Error> {
    let task = state.task_controller.create(&user, params).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub(crate) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<Task>>, Error> {
    Ok(Json(state.task_controller.list(&user).await?))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub(crate) async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Task>, Error> {
    Ok(Json(state.task_controller.get(&user, id).await?))
}

#[instrument(skip(state, user, params), fields(user_id = user.id))]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    PathParam(id): PathParam<i64>,
    JsonBody(params): JsonBody<request::UpdateTaskData>,
) -> Result<Json<Task>, Error> {
    Ok(Json(state.task_controller.update(&user, id, params).await?))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<response::Message>, Error> {
    state.task_controller.delete(&user, id).await?;

    Ok(Json(response::Message {
        message: "Task deleted successfully",
    }))
}
