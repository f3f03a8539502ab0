use axum::extract::{Extension, Json, State};
use axum::http::header;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::auth::CurrentUser;
use crate::controllers::attachment::UploadedFile;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::extract::{PathParam, Upload};
use crate::types::response;

const FILES_FIELD: &str = "files";

#[instrument(skip(state, user, multipart), fields(user_id = user.id))]
pub(crate) async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    PathParam(id): PathParam<i64>,
    Upload(mut multipart): Upload,
) -> Result<Json<response::Uploaded>, Error> {
    // nothing is read from the body until the caller is known to own the task
    let target = state.attachment_controller.authorize_upload(&user, id).await?;

    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();

        files.push(UploadedFile {
            file_name,
            content_type,
            bytes: field.bytes().await?,
        });
    }

    let urls = state.attachment_controller.upload(target, files).await?;

    Ok(Json(response::Uploaded {
        message: "Files uploaded successfully",
        files: urls,
    }))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub(crate) async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<response::Attachments>, Error> {
    Ok(Json(response::Attachments {
        attachments: state.attachment_controller.list(&user, id).await?,
    }))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub(crate) async fn download(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    PathParam((id, name)): PathParam<(i64, String)>,
) -> Result<impl IntoResponse, Error> {
    let object = state
        .attachment_controller
        .download(&user, id, &name)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CONTENT_DISPOSITION, "attachment".to_owned()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_owned()),
        ],
        object.bytes,
    ))
}
