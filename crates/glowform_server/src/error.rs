use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use glowform_core::{AuthServiceError, FormServiceError, RepoError};
use log::error;
use serde_json::json;
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Detail is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn form_not_found() -> Self {
        ApiError::NotFound("Form not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                error!(
                    "event=request_failed module=server status=error error={}",
                    detail
                );
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => message,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => ApiError::BadRequest(err.to_string()),
            RepoError::Conflict(message) => ApiError::Conflict(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FormServiceError> for ApiError {
    fn from(value: FormServiceError) -> Self {
        match value {
            FormServiceError::InvalidInput(message) => ApiError::BadRequest(message),
            FormServiceError::Validation(err) => ApiError::BadRequest(err.to_string()),
            FormServiceError::FormNotFound(_) => ApiError::form_not_found(),
            FormServiceError::Repo(err) => err.into(),
            other @ FormServiceError::InconsistentState(_) => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(value: AuthServiceError) -> Self {
        match value {
            AuthServiceError::InvalidInput(message) => ApiError::BadRequest(message),
            AuthServiceError::EmailTaken => ApiError::Conflict("User already exists".to_string()),
            AuthServiceError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthServiceError::Unauthenticated => ApiError::unauthorized(),
            AuthServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::BadRequest(value.body_text())
    }
}
