use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::ChatError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ChatError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_configuration_error() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        tracing::error!("v0 chat API error: {}", self);
        let status = self.status_code();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
