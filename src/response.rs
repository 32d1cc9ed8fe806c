use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// JSON envelope shared by every route.
#[derive(Deserialize, Serialize, Debug)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub status_message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 200 OK carrying `data`.
    pub fn ok(data: T) -> Self {
        ApiResponse {
            status_code: StatusCode::OK.as_u16(),
            status_message: "OK".to_string(),
            data: Some(data),
        }
    }

    /// Error envelope without data.
    pub fn failure(status: StatusCode, message: String) -> Self {
        ApiResponse {
            status_code: status.as_u16(),
            status_message: message,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}
