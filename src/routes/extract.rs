use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body whose rejections go through [`AppError`], so malformed or
/// mistyped payloads answer `InvalidParameter` like any other bad input.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
