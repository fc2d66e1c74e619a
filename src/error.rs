use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::room::RoomRuleError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller identity is missing.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Invalid input provided by the client.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Caller lacks the privileges for this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Room reached its capacity.
    #[error("{0}")]
    RoomFull(String),
    /// Caller is already a member of the room.
    #[error("{0}")]
    AlreadyJoined(String),
    /// Caller already answered this question.
    #[error("{0}")]
    AlreadyAnswered(String),
    /// Not enough players to start.
    #[error("{0}")]
    InsufficientPlayers(String),
    /// Storage backend failed.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<RoomRuleError> for ServiceError {
    fn from(err: RoomRuleError) -> Self {
        let message = err.to_string();
        match err {
            RoomRuleError::InvalidMaxPlayers(_) | RoomRuleError::QuestionOutOfBounds { .. } => {
                ServiceError::InvalidParameter(message)
            }
            RoomRuleError::InvalidTransition(_)
            | RoomRuleError::NotAcceptingPlayers(_)
            | RoomRuleError::GameNotActive(_)
            | RoomRuleError::NoQuestions => ServiceError::InvalidState(message),
            RoomRuleError::NotAdmin | RoomRuleError::NotMember(_) => {
                ServiceError::Forbidden(message)
            }
            RoomRuleError::RoomFull(_) => ServiceError::RoomFull(message),
            RoomRuleError::AlreadyJoined(_) => ServiceError::AlreadyJoined(message),
            RoomRuleError::AlreadyAnswered(_) => ServiceError::AlreadyAnswered(message),
            RoomRuleError::InsufficientPlayers(_) => ServiceError::InsufficientPlayers(message),
        }
    }
}

impl ServiceError {
    /// Stable machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized(_) => "Unauthorized",
            ServiceError::InvalidParameter(_) => "InvalidParameter",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::InvalidState(_) => "InvalidState",
            ServiceError::Forbidden(_) => "Forbidden",
            ServiceError::RoomFull(_) => "RoomFull",
            ServiceError::AlreadyJoined(_) => "AlreadyJoined",
            ServiceError::AlreadyAnswered(_) => "AlreadyAnswered",
            ServiceError::InsufficientPlayers(_) => "InsufficientPlayers",
            ServiceError::Storage(_) => "InternalFailure",
            ServiceError::Degraded => "Degraded",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::InvalidState(_)
            | ServiceError::RoomFull(_)
            | ServiceError::AlreadyJoined(_)
            | ServiceError::AlreadyAnswered(_)
            | ServiceError::InsufficientPlayers(_) => StatusCode::CONFLICT,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Application-level error converted to an HTTP response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct AppError(#[from] ServiceError);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(ServiceError::InvalidParameter(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError(ServiceError::InvalidParameter(format!(
            "validation failed: {err}"
        )))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status();
        if let ServiceError::Storage(source) = &self.0 {
            tracing::error!(error = %source, transient = source.is_transient(), "storage operation failed");
        }

        let payload = Json(ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_errors_map_to_expected_statuses() {
        let cases = [
            (RoomRuleError::InvalidMaxPlayers(11), StatusCode::BAD_REQUEST),
            (
                RoomRuleError::QuestionOutOfBounds { index: 12, len: 10 },
                StatusCode::BAD_REQUEST,
            ),
            (RoomRuleError::NotAdmin, StatusCode::FORBIDDEN),
            (RoomRuleError::RoomFull(2), StatusCode::CONFLICT),
            (RoomRuleError::AlreadyJoined("a".into()), StatusCode::CONFLICT),
            (RoomRuleError::AlreadyAnswered(0), StatusCode::CONFLICT),
            (RoomRuleError::InsufficientPlayers(1), StatusCode::CONFLICT),
            (RoomRuleError::NoQuestions, StatusCode::CONFLICT),
        ];

        for (rule, expected) in cases {
            let err = AppError::from(ServiceError::from(rule));
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn degraded_and_storage_statuses() {
        let degraded = AppError::from(ServiceError::Degraded).into_response();
        assert_eq!(degraded.status(), StatusCode::SERVICE_UNAVAILABLE);

        let storage = ServiceError::from(StorageError::unavailable(
            "boom".into(),
            std::io::Error::other("io"),
        ));
        assert_eq!(storage.kind(), "InternalFailure");
        assert_eq!(
            AppError::from(storage).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let corrupt = StorageError::Corrupt {
            record: "room `ROOMX`".into(),
            detail: "bad answer key".into(),
        };
        assert!(!corrupt.is_transient());
        assert_eq!(ServiceError::from(corrupt).kind(), "InternalFailure");
    }
}
