// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::contact::validation::FieldErrors;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<FieldErrors>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized {
        message: String,
        details: Option<String>,
    },

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict {
        message: String,
        contact_id: Option<String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (auth service issues)
    BadGateway {
        message: String,
        details: Option<String>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway { message, .. } => message,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway { .. } => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        let details = match self {
            ApiError::ValidationError { field_errors: Some(errors), .. } => Some(json!(errors)),
            ApiError::Unauthorized { details: Some(d), .. } => Some(json!(d)),
            ApiError::BadGateway { details: Some(d), .. } => Some(json!(d)),
            ApiError::Conflict { contact_id: Some(id), .. } => Some(json!({ "contactId": id })),
            _ => None,
        };
        if let Some(details) = details {
            response["details"] = details;
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            details: None,
        }
    }

    pub fn unauthorized_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>, contact_id: Option<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            contact_id,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>, details: Option<String>) -> Self {
        ApiError::BadGateway {
            message: message.into(),
            details,
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        use crate::database::DatabaseError;
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg, None),
            DatabaseError::ConfigMissing(_) | DatabaseError::ConnectionError(_) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("Internal server error")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<crate::filter::FilterError> for ApiError {
    fn from(err: crate::filter::FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<crate::observer::ObserverError> for ApiError {
    fn from(err: crate::observer::ObserverError) -> Self {
        use crate::observer::ObserverError;
        match err {
            ObserverError::ValidationError { message, field_errors } => {
                ApiError::validation_error(message, field_errors)
            }
            ObserverError::BusinessRule(msg) => ApiError::bad_request(msg),
            ObserverError::NotFound(msg) => ApiError::not_found(msg),
            ObserverError::SecurityError(msg) => ApiError::forbidden(msg),
            ObserverError::Conflict { message, contact_id } => ApiError::conflict(message, contact_id),
            ObserverError::DatabaseError(db_err) => db_err.into(),
            ObserverError::TimeoutError(msg) => {
                tracing::error!("Observer timeout: {}", msg);
                ApiError::internal_server_error("Request processing timed out")
            }
            ObserverError::PipelineError(msg) => {
                tracing::error!("Pipeline error: {}", msg);
                ApiError::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::NotConfigured | AuthError::InvalidUrl(_) | AuthError::Client(_) => {
                ApiError::internal_server_error("Configuration error")
            }
            AuthError::Rejected { message, details } => ApiError::unauthorized_with_details(message, details),
            AuthError::Unavailable { message, details } => ApiError::bad_gateway(message, Some(details)),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_carries_existing_contact_id() {
        let err = ApiError::conflict("Contact with this email already exists", Some("c123".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["details"]["contactId"], "c123");
    }

    #[test]
    fn validation_error_lists_fields() {
        let mut fields = FieldErrors::new();
        fields.insert("firstName".into(), vec!["must be between 2 and 50 characters".into()]);
        let body = ApiError::validation_error("Validation error", Some(fields)).to_json();
        assert_eq!(body["error"], "Validation error");
        assert_eq!(body["details"]["firstName"][0], "must be between 2 and 50 characters");
    }

    #[test]
    fn sql_errors_are_not_leaked() {
        let err: ApiError = crate::database::DatabaseError::QueryError("syntax error at \"FROM\"".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }
}
