use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::instrument;

use crate::auth::CurrentUser;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::extract::JsonBody;
use crate::types::{request, response};

#[instrument(skip_all, fields(username = %params.username))]
pub(crate) async fn signup(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<request::SignupData>,
) -> Result<impl IntoResponse, Error> {
    let user = state
        .user_controller
        .signup(&params.username, &params.email, &params.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(response::Signup {
            message: "User created successfully",
            user: (&user).into(),
        }),
    ))
}

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(params): JsonBody<request::LoginData>,
) -> Result<impl IntoResponse, Error> {
    let (user, token) = state
        .user_controller
        .login(&params.identifier, &params.password)
        .await?;

    let cookie = state.session_cookie.issue(&token)?;

    tracing::info!(user_id = user.id, "logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(response::Login::new(&user, &token)),
    ))
}

pub(crate) async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let cookie = state.session_cookie.clear()?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(response::Message {
            message: "Logged out successfully",
        }),
    ))
}

pub(crate) async fn validate(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(response::Validate {
        message: "User is authenticated",
        user: (&user).into(),
    })
}
