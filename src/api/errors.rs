//! API Error Handling
//!
//! Structured error responses with HTTP status codes and request tracking.

use crate::errors::{GameError, InvalidGuess, NumeritoError, ScoreStoreError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// INVALID_GUESS, GAME_NOT_FOUND, VALIDATION_ERROR, ...
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    InvalidGuess(InvalidGuess),
    Validation(String),
    NotFound(String),
    AlreadyFinished(String),
    AlreadyRecorded(String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_guess(request_id: String, reason: InvalidGuess) -> Self {
        Self {
            kind: ApiErrorKind::InvalidGuess(reason),
            request_id,
        }
    }

    pub fn validation(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Validation(message),
            request_id,
        }
    }

    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Internal(message),
            request_id,
        }
    }

    pub fn from_game(request_id: String, err: GameError) -> Self {
        match err {
            GameError::InvalidGuess(reason) => Self::invalid_guess(request_id, reason),
            GameError::GameAlreadyFinished => Self {
                kind: ApiErrorKind::AlreadyFinished(err.to_string()),
                request_id,
            },
            GameError::SessionNotFound { .. } => Self::not_found(request_id, err.to_string()),
            GameError::IdAllocationFailed { .. } => {
                error!(request_id = %request_id, error = %err, "game could not be created");
                Self::internal_error(request_id, "failed to create game".to_string())
            }
            GameError::ScoreInvariant(_) => {
                error!(request_id = %request_id, error = %err, "scoring produced an inconsistent result");
                Self::internal_error(request_id, "failed to score guess".to_string())
            }
        }
    }

    pub fn from_numerito(request_id: String, err: NumeritoError) -> Self {
        match err {
            NumeritoError::Game(e) => Self::from_game(request_id, e),
            NumeritoError::Scores(e) => Self::from_scores(request_id, e),
            other => {
                error!(request_id = %request_id, error = %other, "request failed");
                Self::internal_error(request_id, "internal error".to_string())
            }
        }
    }

    pub fn from_scores(request_id: String, err: ScoreStoreError) -> Self {
        match err {
            ScoreStoreError::Invalid(_) | ScoreStoreError::GameNotFinished { .. } => {
                Self::validation(request_id, err.to_string())
            }
            ScoreStoreError::AlreadyRecorded { .. } => Self {
                kind: ApiErrorKind::AlreadyRecorded(err.to_string()),
                request_id,
            },
            ScoreStoreError::Io(_) | ScoreStoreError::Serialization(_) => {
                error!(request_id = %request_id, error = %err, "score storage failed");
                Self::internal_error(request_id, "failed to access score storage".to_string())
            }
        }
    }

    pub fn from_rejection(request_id: String, rejection: JsonRejection) -> Self {
        Self::validation(request_id, rejection.body_text())
    }

    fn parts(&self) -> (StatusCode, &'static str) {
        match &self.kind {
            ApiErrorKind::InvalidGuess(_) => (StatusCode::BAD_REQUEST, "INVALID_GUESS"),
            ApiErrorKind::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiErrorKind::NotFound(_) => (StatusCode::NOT_FOUND, "GAME_NOT_FOUND"),
            ApiErrorKind::AlreadyFinished(_) => (StatusCode::CONFLICT, "GAME_ALREADY_FINISHED"),
            ApiErrorKind::AlreadyRecorded(_) => (StatusCode::CONFLICT, "SCORE_ALREADY_RECORDED"),
            ApiErrorKind::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn message(&self) -> String {
        match &self.kind {
            ApiErrorKind::InvalidGuess(reason) => reason.to_string(),
            ApiErrorKind::Validation(msg)
            | ApiErrorKind::NotFound(msg)
            | ApiErrorKind::AlreadyFinished(msg)
            | ApiErrorKind::AlreadyRecorded(msg)
            | ApiErrorKind::Internal(msg) => msg.clone(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.request_id, self.parts().1, self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        let details = match &self.kind {
            ApiErrorKind::InvalidGuess(reason) => Some(serde_json::json!({ "rule": reason.rule() })),
            _ => None,
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id.clone(),
            error: ErrorBody {
                code: code.to_string(),
                message: self.message(),
                details,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid() -> String {
        "req-1".to_string()
    }

    #[test]
    fn test_game_errors_map_to_status_codes() {
        let cases = [
            (GameError::InvalidGuess(InvalidGuess::LeadingZero), StatusCode::BAD_REQUEST),
            (GameError::GameAlreadyFinished, StatusCode::CONFLICT),
            (
                GameError::SessionNotFound {
                    session_id: "x".to_string(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                GameError::IdAllocationFailed { attempts: 16 },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from_game(rid(), err).status(), status);
        }
    }

    #[test]
    fn test_score_errors_map_to_status_codes() {
        let err = ApiError::from_scores(rid(), ScoreStoreError::Invalid("bad".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from_scores(
            rid(),
            ScoreStoreError::AlreadyRecorded {
                session_id: "g".to_string(),
            },
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("SCORE_ALREADY_RECORDED"));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ApiError::from_numerito(rid(), NumeritoError::Scores(io.into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // storage details stay out of the response
        assert!(!err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_display_includes_request_id_and_code() {
        let err = ApiError::invalid_guess(rid(), InvalidGuess::WrongLength { received: 3 });
        let text = err.to_string();
        assert!(text.starts_with("[req-1] INVALID_GUESS"));
        assert!(text.contains("received 3"));
    }
}
