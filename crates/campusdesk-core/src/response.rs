//! Uniform success envelope.
//!
//! Every handler answers with the same outer shape:
//!
//! ```json
//! { "status": 200, "message": "...", "data": { "success": true, "data": ... } }
//! ```
//!
//! Failures use the same shape with `success: false` (see [`crate::AppError`]).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize)]
pub struct Payload<T> {
    pub success: bool,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    code: StatusCode,
    pub status: u16,
    pub message: String,
    pub data: Payload<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(code: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code,
            status: code.as_u16(),
            message: message.into(),
            data: Payload {
                success: code.is_success(),
                data,
            },
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }
}

impl ApiResponse<()> {
    /// Success without a body, e.g. after a delete.
    pub fn empty(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message, None)
    }
}

/// Failure envelope as rendered by [`crate::AppError`], for API docs.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    pub data: ErrorPayload,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorPayload {
    pub success: bool,
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_envelope_shape() {
        let response = ApiResponse::created("Item posted successfully", vec![1, 2]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 201);
        assert_eq!(json["message"], "Item posted successfully");
        assert_eq!(json["data"]["success"], true);
        assert_eq!(json["data"]["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_empty_envelope_has_null_data() {
        let json = serde_json::to_value(ApiResponse::empty("Item deleted successfully")).unwrap();
        assert_eq!(json["status"], 200);
        assert!(json["data"]["data"].is_null());
        assert_eq!(json["data"]["success"], true);
    }
}
