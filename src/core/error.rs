use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
    #[error("No signing secret configured (set TASKTRACK_SECRET)")]
    MissingSecret,
    #[error("Signing secret is a well-known placeholder: {0:?}")]
    InsecureSecret(String),
    #[error("token_ttl_secs must be between 1 and one year, got {0}")]
    InvalidTokenTtl(i64),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("No credentials provided")]
    MissingCredential,
    #[error("Invalid token: {0}")]
    InvalidCredential(jsonwebtoken::errors::Error),
    #[error("Malformed token subject")]
    MalformedSubject,
    #[error("Expired token")]
    ExpiredCredential,
    #[error("Token subject does not resolve to a user")]
    UnknownIdentity,
    #[error("Invalid login")]
    InvalidLogin,
    #[error("Forbidden")]
    Forbidden,
    #[error("Resource not found")]
    NotFound,
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Credential store timed out")]
    StoreTimeout,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Invalid username")]
    InvalidUsername,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Invalid password: {0}")]
    InvalidPassword(String),
    #[error("Invalid task: {0}")]
    InvalidTask(String),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("Rejected JSON body: {0}")]
    JsonBody(#[from] JsonRejection),
    #[error("Rejected path parameter: {0}")]
    PathParam(#[from] PathRejection),
    #[error("Rejected form-data: {0}")]
    MultipartBody(#[from] MultipartRejection),
    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl Error {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Error::MissingCredential
            | Error::InvalidCredential(_)
            | Error::MalformedSubject
            | Error::ExpiredCredential
            | Error::UnknownIdentity
            | Error::InvalidLogin => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::UserAlreadyExists => StatusCode::CONFLICT,
            Error::InvalidUsername
            | Error::InvalidEmail
            | Error::InvalidPassword(_)
            | Error::InvalidTask(_)
            | Error::InvalidUpload(_)
            | Error::Multipart(_) => StatusCode::BAD_REQUEST,
            Error::JsonBody(rejection) => rejection.status(),
            Error::PathParam(rejection) => rejection.status(),
            Error::MultipartBody(rejection) => rejection.status(),
            Error::Sql(_) | Error::StoreTimeout => StatusCode::SERVICE_UNAVAILABLE,
            Error::Jwt(_) | Error::Bcrypt(_) | Error::IO(_) | Error::Join(_) | Error::Header(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Error::MissingCredential => "Missing authentication token".into(),
            Error::InvalidCredential(_) | Error::MalformedSubject => "Invalid token".into(),
            Error::ExpiredCredential => "Token expired".into(),
            Error::UnknownIdentity => "User not found".into(),
            Error::InvalidLogin => "Invalid email/password".into(),
            Error::Forbidden => "Access denied".into(),
            Error::NotFound => "Not found".into(),
            Error::UserAlreadyExists => "Username or email already exists".into(),
            Error::InvalidUsername => {
                "Username must be 3-20 characters of letters, digits, '_' or '-'".into()
            }
            Error::InvalidEmail => "Invalid email address".into(),
            Error::InvalidPassword(reason)
            | Error::InvalidTask(reason)
            | Error::InvalidUpload(reason) => reason.clone(),
            Error::Multipart(_) => "Invalid form-data".into(),
            Error::JsonBody(rejection) => rejection.body_text(),
            Error::PathParam(rejection) => rejection.body_text(),
            Error::MultipartBody(rejection) => rejection.body_text(),
            Error::Sql(_) | Error::StoreTimeout => "Credential store unavailable".into(),
            Error::Jwt(_) => "Failed to create token".into(),
            Error::Bcrypt(_) => "Failed to hash password".into(),
            Error::IO(_) => "Attachment storage error".into(),
            Error::Join(_) | Error::Header(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!("{:?}", self);
        } else {
            tracing::warn!("{}", self);
        }

        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

pub(crate) async fn handle_middleware_errors(err: BoxError) -> (StatusCode, &'static str) {
    if err.is::<tower::timeout::error::Elapsed>() {
        return (StatusCode::REQUEST_TIMEOUT, "Request timed out");
    }

    tracing::error!("Unhandled error: {:?}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}
