use axum_macros::{FromRequest, FromRequestParts};

use crate::core::error::Error;

/// `axum::Json` whose rejections render like every other [`Error`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub(crate) struct JsonBody<T>(pub(crate) T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub(crate) struct PathParam<T>(pub(crate) T);

#[derive(FromRequest)]
#[from_request(rejection(Error))]
pub(crate) struct Upload(pub(crate) axum::extract::Multipart);
