use lx_core::{CoreError, LaunchFailure, PoolError, Rejected};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<Rejected<CoreError>> for ApiError {
    fn from(rejected: Rejected<CoreError>) -> Self {
        let (_, error) = rejected.into_parts();
        ApiError::Core(error)
    }
}

impl From<LaunchFailure> for ApiError {
    fn from(failure: LaunchFailure) -> Self {
        ApiError::Core(failure.into_error())
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::NotFound(id) => ApiError::NotFound(format!("task provider {id}")),
            other => ApiError::InvalidRequest(other.to_string()),
        }
    }
}

#[cfg(feature = "http")]
impl ApiError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Core(err) => match err {
                CoreError::ProviderNotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::AdmissionFailed {
                    source: PoolError::Duplicate(_),
                    ..
                } => StatusCode::CONFLICT,
                CoreError::AdmissionFailed { .. } => StatusCode::BAD_REQUEST,
                CoreError::InsufficientResources => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "http"))]
mod tests {
    use axum::http::StatusCode;
    use lx_model::TaskId;

    use super::*;

    #[test]
    fn core_errors_map_to_status_codes() {
        let dup = ApiError::from(CoreError::AdmissionFailed {
            task: TaskId::from("t1"),
            source: PoolError::Duplicate(TaskId::from("t1")),
        });
        assert_eq!(dup.status_code(), StatusCode::CONFLICT);

        let invalid = ApiError::from(CoreError::AdmissionFailed {
            task: TaskId::from("t1"),
            source: PoolError::InvalidState("no provider".into()),
        });
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let empty = ApiError::from(CoreError::InsufficientResources);
        assert_eq!(empty.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let closed = ApiError::from(CoreError::DispatchClosed);
        assert_eq!(closed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn launch_failure_keeps_the_core_status() {
        let err = ApiError::from(LaunchFailure::new(CoreError::InsufficientResources, 0, 0, vec![]));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_provider_is_not_found() {
        let err = ApiError::from(PoolError::NotFound("p".into()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
