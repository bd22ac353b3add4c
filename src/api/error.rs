use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::scoring::ScoringError;
use crate::services::ServiceError;
use crate::training::TrainingError;

/// Errors returned to HTTP clients as `{ "message": ... }`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::BadRequest(format!("validation failed: {}", err))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("invalid path: {}", rejection.body_text()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<ScoringError> for ApiError {
    fn from(err: ScoringError) -> Self {
        if err.is_conflict() {
            ApiError::Conflict(err.to_string())
        } else {
            ApiError::BadRequest(err.to_string())
        }
    }
}

impl From<TrainingError> for ApiError {
    fn from(err: TrainingError) -> Self {
        match err {
            TrainingError::Finished => ApiError::Conflict(err.to_string()),
            TrainingError::UnknownMode(_) => ApiError::BadRequest(err.to_string()),
            TrainingError::Scoring(inner) => inner.into(),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ServiceError::InvalidInput(message) => ApiError::BadRequest(message),
            ServiceError::Conflict(message) => ApiError::Conflict(message),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        anyhow::Error::from(err).into()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ScoringError>() {
            Ok(scoring) => return scoring.into(),
            Err(err) => err,
        };
        let err = match err.downcast::<TrainingError>() {
            Ok(training) => return training.into(),
            Err(err) => err,
        };
        let err = match err.downcast::<ServiceError>() {
            Ok(service) => return service.into(),
            Err(err) => err,
        };

        log::error!("Request failed: {:#}", err);
        ApiError::Internal("internal server error".to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_client_error() {
            log::warn!("Rejected request ({}): {}", status, self);
        }

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: anyhow::Error) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_domain_errors_map_to_status() {
        assert_eq!(status_of(ScoringError::InvalidSegment(30).into()), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ScoringError::LegFinished.into()), StatusCode::CONFLICT);
        assert_eq!(status_of(TrainingError::Finished.into()), StatusCode::CONFLICT);
        assert_eq!(
            status_of(ServiceError::NotFound("player 3".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(anyhow::anyhow!("disk full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_does_not_hide_domain_error() {
        use anyhow::Context;
        let err = Err::<(), _>(ScoringError::DartsAfterCheckout)
            .context("recording visit")
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
