use axum::extract::{Extension, Json, State};
use axum::response::IntoResponse;
use tracing::instrument;

use crate::auth::CurrentUser;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::response;

#[instrument(skip_all, fields(user_id = user.id))]
pub(crate) async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, Error> {
    let users = state.user_controller.list_users(&user).await?;

    Ok(Json(
        users.iter().map(response::User::from).collect::<Vec<_>>(),
    ))
}
