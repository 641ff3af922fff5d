use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use planner_types::api::{ErrorKind, ErrorResponse};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Every service operation fails with one of these. None of them is retried
/// here; the message of `Internal` never reaches the client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// Username already taken.
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials, or a missing, invalid or expired token.
    #[error("{0}")]
    Authentication(String),

    /// Valid token, but the caller is not a lieutenant of the platoon involved.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Store or crypto failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn invalid_credentials() -> Self {
        Self::Authentication("Invalid credentials".into())
    }

    pub fn mission_not_found() -> Self {
        Self::NotFound("Mission not found".into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Internal(e) => {
                error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: message,
            kind: self.kind(),
        });

        (self.status(), body).into_response()
    }
}

/// Run blocking service work (argon2, SQLite) off the async runtime.
pub async fn blocking<F, T>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ServiceError::Internal(anyhow::anyhow!("blocking task failed: {}", e))
    })?
}
