use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orderdesk_store::RegistryError;

/// Errors surfaced to HTTP callers as a status code and a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request method")]
    MethodNotAllowed,

    /// Request body did not decode; carries the decoder's message.
    #[error("{0}")]
    BadRequest(String),

    #[error("Order not found")]
    NotFound,

    #[error("Too many open sessions")]
    TooManySessions,

    /// Server-side failure; `kind` is the source error's classification.
    #[error("{message}")]
    Internal { kind: &'static str, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::TooManySessions => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound => "not_found",
            Self::TooManySessions => "too_many_sessions",
            Self::Internal { kind, .. } => *kind,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(_) => Self::NotFound,
            RegistryError::IdSpaceExhausted { .. } => Self::Internal {
                kind: e.error_kind(),
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.error_kind();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), kind, error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), kind, error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::TooManySessions.status(), StatusCode::SERVICE_UNAVAILABLE);
        let internal = ApiError::Internal {
            kind: "x",
            message: "x".into(),
        };
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn registry_errors_convert() {
        let not_found: ApiError = RegistryError::NotFound("ABCDE".into()).into();
        assert!(matches!(not_found, ApiError::NotFound));

        let exhausted: ApiError = RegistryError::IdSpaceExhausted { attempts: 64 }.into();
        assert_eq!(exhausted.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(exhausted.to_string().contains("64 attempts"));
        assert_eq!(exhausted.error_kind(), "id_space_exhausted");
    }

    #[test]
    fn error_kinds() {
        assert_eq!(ApiError::MethodNotAllowed.error_kind(), "method_not_allowed");
        assert_eq!(ApiError::BadRequest("x".into()).error_kind(), "bad_request");
        let not_found: ApiError = RegistryError::NotFound("ABCDE".into()).into();
        assert_eq!(not_found.error_kind(), "not_found");
        assert_eq!(ApiError::TooManySessions.error_kind(), "too_many_sessions");
    }

    #[test]
    fn into_response_uses_variant_status() {
        let resp = ApiError::MethodNotAllowed.into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
