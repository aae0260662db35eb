//! HTTP rendering of [`AppError`] (behind the `axum` feature)
//!
//! Body shape: `{"error": message}`, plus `"details": [codes]` when present.

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut body = serde_json::json!({ "error": self.message() });
        if !self.details().is_empty() {
            body["details"] = serde_json::json!(self.details());
        }

        (status, Json(body)).into_response()
    }
}
