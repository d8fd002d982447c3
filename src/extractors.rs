use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` с ошибками разбора в формате `ApiError` (400 VALIDATION_ERROR)
/// вместо стандартного 422 с текстом.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
