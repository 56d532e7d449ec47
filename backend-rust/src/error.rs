//! error.rs: HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use practice_core::PlannerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error("failed to persist state: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Planner(e) => match e {
                PlannerError::UnknownGroup(_) => StatusCode::NOT_FOUND,
                PlannerError::EmptyName | PlannerError::EmptyRotation => StatusCode::BAD_REQUEST,
                _ => StatusCode::CONFLICT,
            },
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("❌ {message}");
        } else {
            warn!("Request rejected ({status}): {message}");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::GroupKind;

    #[test]
    fn planner_errors_map_to_client_statuses() {
        let cases = [
            (PlannerError::UnknownGroup("g".into()), StatusCode::NOT_FOUND),
            (PlannerError::EmptyName, StatusCode::BAD_REQUEST),
            (
                PlannerError::KindMismatch { from: GroupKind::Group, to: GroupKind::Partner },
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn persistence_failure_is_a_server_error() {
        let err = ApiError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("disk full"));
    }
}
