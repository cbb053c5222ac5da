use thiserror::Error;
use crate::domain::error::{DomainError, TransformError};
use crate::domain::separator::SeparatorError;
use crate::infrastructure::error::InfrastructureError;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError),

    #[error("Could not decode image: {0}")]
    Decode(#[source] InfrastructureError),

    #[error("Image transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Background separation failed: {0}")]
    Separator(#[from] SeparatorError),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Infrastructure error occurred: {0}")]
    InfrastructureError(#[from] InfrastructureError),
}

impl ApplicationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApplicationError::Validation(_) | ApplicationError::Decode(_) => StatusCode::BAD_REQUEST,
            ApplicationError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            ApplicationError::Separator(SeparatorError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApplicationError::Separator(_) => StatusCode::BAD_GATEWAY,
            ApplicationError::Transform(_)
            | ApplicationError::ConfigurationError(_)
            | ApplicationError::InfrastructureError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApplicationError::Validation(_) => "validation_error",
            ApplicationError::Decode(_) => "decode_error",
            ApplicationError::Transform(_) => "transform_error",
            ApplicationError::Separator(_) => "separator_error",
            ApplicationError::ImageNotFound(_) => "not_found",
            ApplicationError::ConfigurationError(_) => "configuration_error",
            ApplicationError::InfrastructureError(_) => "internal_error",
        }
    }

    // 呼び出し側でリトライしてよいのは外部サービス起因のものだけ
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApplicationError::Separator(e) if e.is_retryable())
    }
}

// IntoResponse implementation for ApplicationError
use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let error_message = match &self {
            ApplicationError::Validation(_)
            | ApplicationError::Decode(_)
            | ApplicationError::ImageNotFound(_)
            | ApplicationError::Separator(_) => self.to_string(),
            // サーバ側の障害は詳細を返さずログにだけ残す
            ApplicationError::Transform(_) => {
                log::error!("Transform failure: {:?}", self);
                "Image transform failed".to_string()
            }
            ApplicationError::ConfigurationError(_) | ApplicationError::InfrastructureError(_) => {
                log::error!("Internal failure: {:?}", self);
                "An unexpected error occurred.".to_string()
            }
        };
        let body = Json(json!({ "error": error_message, "code": code }));
        (status, body).into_response()
    }
}
