use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::backend::BackendError;
use crate::gateway::outcome::Outcome;

/// Gateway-level error type.
///
/// The `Display` text of each variant is the message a caller sees in the
/// `{success: false, error}` outcome, so backend messages are carried verbatim.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Record does not belong to the current profile")]
    Forbidden,

    #[error("{0}")]
    Auth(String),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Failed to create profile: {0}")]
    ProfileCreation(String),

    #[error("{0}")]
    Backend(String),

    #[error("Session store error: {0}")]
    Session(anyhow::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// Wraps an auth API failure, keeping the backend's own wording.
    pub fn auth(err: BackendError) -> Self {
        GatewayError::Auth(err.message())
    }
}

impl From<BackendError> for GatewayError {
    fn from(err: BackendError) -> Self {
        GatewayError::Backend(err.message())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Internal(anyhow::Error::new(err).context("Malformed record"))
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            GatewayError::ProfileNotFound => StatusCode::NOT_FOUND,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
            GatewayError::Auth(_) | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::ProfileCreation(msg) | GatewayError::Backend(msg) => {
                tracing::error!("Backend error: {msg}");
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Session(e) | GatewayError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(Outcome::<()>::Failure(self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_api_message_passes_through_verbatim() {
        let err: GatewayError = BackendError::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn test_auth_error_keeps_backend_wording() {
        let err = GatewayError::auth(BackendError::Api {
            status: 400,
            message: "Invalid login credentials".to_string(),
        });
        assert!(matches!(err, GatewayError::Auth(_)));
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(GatewayError::NotAuthenticated.to_string(), "Not authenticated");
        assert_eq!(GatewayError::ProfileNotFound.to_string(), "Profile not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            GatewayError::NotAuthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::BadRequest("missing field".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::Backend("boom".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
