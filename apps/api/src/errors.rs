use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error taxonomy.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// `service` identifies the external collaborator ("scraping provider",
/// "inference provider", "observability backend") — never the credential.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Required configuration '{0}' is not set")]
    ConfigurationMissing(String),

    #[error("{service} is unavailable: {message}")]
    UpstreamUnavailable {
        service: &'static str,
        message: String,
    },

    #[error("{service} rate limited the request")]
    RateLimited { service: &'static str },

    #[error("{service} rejected the configured credential")]
    AuthenticationFailed { service: &'static str },

    #[error("{service} returned a malformed response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    #[error("completion contained no ranked sections")]
    UnparsableCompletion,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable code used in response bodies and trace events.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ConfigurationMissing(_) => "CONFIGURATION_MISSING",
            AppError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::AuthenticationFailed { .. } => "AUTHENTICATION_FAILED",
            AppError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            AppError::UnparsableCompletion => "UNPARSABLE_COMPLETION",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigurationMissing(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamUnavailable { .. }
            | AppError::AuthenticationFailed { .. }
            | AppError::MalformedResponse { .. }
            | AppError::UnparsableCompletion => StatusCode::BAD_GATEWAY,
        }
    }

    /// Human-readable message safe to surface to a client. Internal and
    /// configuration details are logged server-side and replaced.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
            AppError::ConfigurationMissing(key) => {
                tracing::error!("Missing configuration: {key}");
                "The service is misconfigured".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Classifies a reqwest transport failure for the given collaborator.
    /// Timeouts are treated identically to an unreachable upstream.
    pub fn from_transport(service: &'static str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            // reqwest::Error Display carries no request bodies or headers
            err.to_string()
        };
        AppError::UpstreamUnavailable { service, message }
    }

    /// Classifies a non-success HTTP status from an external collaborator.
    pub fn from_status(service: &'static str, status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => AppError::AuthenticationFailed { service },
            429 => AppError::RateLimited { service },
            code => AppError::UpstreamUnavailable {
                service,
                message: format!("HTTP {code}"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = (self.status(), self.kind());
        let message = self.user_message();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_auth_codes() {
        let err = AppError::from_status("inference provider", reqwest::StatusCode::UNAUTHORIZED);
        assert!(matches!(err, AppError::AuthenticationFailed { .. }));
        assert_eq!(err.kind(), "AUTHENTICATION_FAILED");
    }

    #[test]
    fn test_from_status_maps_429_to_rate_limited() {
        let err =
            AppError::from_status("inference provider", reqwest::StatusCode::TOO_MANY_REQUESTS);
        assert!(matches!(err, AppError::RateLimited { .. }));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_from_status_maps_5xx_to_upstream_unavailable() {
        let err = AppError::from_status("scraping provider", reqwest::StatusCode::BAD_GATEWAY);
        assert!(matches!(err, AppError::UpstreamUnavailable { .. }));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_display_never_includes_credentials() {
        // Error messages carry only the collaborator name and status detail.
        let err = AppError::AuthenticationFailed {
            service: "scraping provider",
        };
        let text = err.to_string();
        assert!(text.contains("scraping provider"));
        assert!(!text.to_lowercase().contains("key"));
    }
}
