use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use budgetbook_core::errors::{DatabaseError, Error as CoreError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to render page: {0}")]
    Render(#[from] tera::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Core(CoreError::Database(DatabaseError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Core(CoreError::Database(
                DatabaseError::UniqueViolation(_) | DatabaseError::ForeignKeyViolation(_),
            )) => StatusCode::BAD_REQUEST,
            ApiError::Core(CoreError::Validation(_) | CoreError::Repository(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Core(_) | ApiError::Render(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
        let body = Json(json!({
            "code": status.as_u16(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
