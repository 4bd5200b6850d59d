use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Envelope wrapping every `/api/users` response body.
///
/// `code` mirrors the HTTP status; `data` is `null` on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self { code: StatusCode::OK.as_u16(), message: message.into(), data: Some(data) }
    }
}

impl ApiResult<()> {
    pub fn failure(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code: code.as_u16(), message: message.into(), data: None }
    }
}

impl<T: Serialize> IntoResponse for ApiResult<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
