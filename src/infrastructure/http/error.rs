//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 正文为空时的提示
pub const EMPTY_TEXT_MESSAGE: &str = "Please enter some text to generate audio.";

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const NOT_FOUND: i32 = 404;
    pub const EMPTY_TEXT: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// 提示性错误（如正文为空），不算失败
    Warning(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    /// 给错误信息加上前缀，提示性错误保持原样
    pub fn context(self, prefix: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", prefix, msg);
        match self {
            ApiError::NotFound(msg) => ApiError::NotFound(wrap(msg)),
            ApiError::BadRequest(msg) => ApiError::BadRequest(wrap(msg)),
            ApiError::Internal(msg) => ApiError::Internal(wrap(msg)),
            ApiError::ServiceUnavailable(msg) => ApiError::ServiceUnavailable(wrap(msg)),
            warning @ ApiError::Warning(_) => warning,
        }
    }

    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Warning(_) => errno::EMPTY_TEXT,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Warning(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message();
        match &self {
            ApiError::NotFound(_) => {
                tracing::warn!(errno, error = %msg, "Resource not found");
            }
            ApiError::BadRequest(_) => {
                tracing::warn!(errno, error = %msg, "Bad request");
            }
            ApiError::Warning(_) => {
                tracing::warn!(errno, error = %msg, "Request rejected");
            }
            ApiError::Internal(_) => {
                tracing::error!(errno, error = %msg, "Internal server error");
            }
            ApiError::ServiceUnavailable(_) => {
                tracing::error!(errno, error = %msg, "Service unavailable");
            }
        }

        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::EmptyText => ApiError::Warning(EMPTY_TEXT_MESSAGE.to_string()),
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::SynthesisError(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::CodecError(msg) => ApiError::BadRequest(msg),
            ApplicationError::StorageError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}
