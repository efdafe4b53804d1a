//! Extractors whose rejections use the API error body.
//!
//! axum's own `Json`/`Query`/`Path` reject with plain-text bodies (and 415 or
//! 422 statuses); these wrappers route every rejection through [`AppError`]
//! so clients always see `{"message", "code"}` with status 400.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
