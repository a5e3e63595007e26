//! JSON, query and path extractors that reject with [`AppError`].
//!
//! Axum's own extractors answer malformed input with plain-text 400/422
//! responses; these wrappers turn every rejection into a 400 with the
//! standard error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::http::error::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
