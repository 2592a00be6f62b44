use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pairlink_core::{ErrorBody, ErrorCode};

/// Error reply of the HTTP surface, rendered as an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn room_not_found(room: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ErrorCode::RoomNotFound,
            format!("room '{room}' has no offer"),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let (status, code) = match err {
            StoreError::OfferMissing => (StatusCode::NOT_FOUND, ErrorCode::RoomNotFound),
            StoreError::SlotTaken(_) => (StatusCode::CONFLICT, ErrorCode::SlotTaken),
            StoreError::KindMismatch(_) => (StatusCode::BAD_REQUEST, ErrorCode::KindMismatch),
            StoreError::RoomFull(_) => (StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::RoomFull),
        };
        Self::new(status, code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
