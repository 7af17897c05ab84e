use super::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile store unavailable: {0}")]
    Store(#[from] PersistenceError),
}

#[derive(Debug)]
pub(super) struct HttpApiError {
    pub(super) status: StatusCode,
    pub(super) error: ApiError,
}

impl HttpApiError {
    pub(super) fn bad_request(message: impl Into<String>, field: Option<&str>) -> Self {
        let mut error = ApiError::new(ErrorCode::ValidationFailed, message, None);
        if let Some(field) = field {
            error = error.with_field(field);
        }
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    pub(super) fn internal(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new(ErrorCode::InternalError, message, details),
        }
    }

    pub(super) fn from_game(err: GameError) -> Self {
        let message = err.to_string();
        match err {
            GameError::Validation { field, .. } => Self::bad_request(message, Some(&field)),
            GameError::Precondition(_) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new(ErrorCode::PreconditionFailed, message, None),
            },
            GameError::NotFound { kind, id } => Self {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    ErrorCode::NotFound,
                    message,
                    Some(format!("kind={kind} id={id}")),
                ),
            },
            GameError::Conflict(_) => Self {
                status: StatusCode::CONFLICT,
                error: ApiError::new(ErrorCode::Conflict, message, None),
            },
        }
    }

    pub(super) fn from_service(err: ServiceError) -> Self {
        match err {
            ServiceError::Game(err) => Self::from_game(err),
            ServiceError::Persistence(err) => {
                tracing::error!(target: "career::service", error = %err, "persistence.failed");
                Self::internal("persistence operation failed", Some(err.to_string()))
            }
        }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
