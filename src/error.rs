use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Shown when the backend fails without a message of its own.
pub const GENERIC_ERROR_MESSAGE: &str = "Đã có lỗi xảy ra, vui lòng thử lại sau";

/// Field name → message, for form errors shown next to their inputs.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// ApiError
///
/// Failure of a call to the REST backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("unexpected backend response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The text a toast should display.
    pub fn user_message(&self) -> &str {
        match self {
            ApiError::Backend { message, .. } => message,
            ApiError::Transport(_) | ApiError::Decode(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// AppError
///
/// Everything a storefront handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("not signed in")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self {
            AppError::Api(err) => {
                let status = match &err {
                    ApiError::Backend { status, .. } => {
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    ApiError::Transport(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
                };
                tracing::warn!(error = %err, "Backend call failed");
                (status, err.user_message().to_string(), None)
            }
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Vui lòng kiểm tra lại thông tin".to_string(),
                Some(fields),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Vui lòng đăng nhập để tiếp tục".to_string(),
                None,
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Không tìm thấy nội dung".to_string(),
                None,
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Tệp vượt quá dung lượng cho phép".to_string(),
                None,
            ),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
            fields,
        });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
