//! Sistema de tratamento de erros
//!
//! Este módulo define todos os tipos de erro da aplicação
//! e sua conversão em respostas HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clients::ClientError;
use crate::domain::DomainError;
use crate::utils::signature::SignatureError;

/// SQLSTATE de violação de constraint EXCLUDE
const EXCLUSION_VIOLATION: &str = "23P01";
/// SQLSTATE de falha de serialização
const SERIALIZATION_FAILURE: &str = "40001";
const UNIQUE_VIOLATION: &str = "23505";

/// Erros principais da aplicação
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl From<sqlx::Error> for AppError {
    /// Corridas resolvidas pelo banco viram 409. Só a EXCLUDE é regra de
    /// negócio; falha de serialização pode ser refeita e não é `Domain`
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(EXCLUSION_VIOLATION) => {
                    return AppError::Domain(DomainError::Conflict(
                        "o período conflita com outro já confirmado".to_string(),
                    ))
                }
                Some(SERIALIZATION_FAILURE) => {
                    return AppError::Conflict(
                        "operação concorrente detectada, tente novamente".to_string(),
                    )
                }
                Some(UNIQUE_VIOLATION) => {
                    return AppError::Conflict(format!(
                        "registro duplicado ({})",
                        db_err.constraint().unwrap_or("unique")
                    ))
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::ExternalApi(err.to_string())
    }
}

impl From<SignatureError> for AppError {
    fn from(err: SignatureError) -> Self {
        tracing::warn!("🔒 Webhook com assinatura inválida: {}", err);
        AppError::Unauthorized(format!("Assinatura do webhook inválida: {}", err))
    }
}

/// Resposta de erro da API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

fn domain_response(err: DomainError) -> (StatusCode, ErrorResponse) {
    let message = err.to_string();
    match err {
        DomainError::InvalidRange(_) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid Range", message, "INVALID_RANGE"),
        ),
        DomainError::InvalidInput(_) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Invalid Input", message, "INVALID_INPUT"),
        ),
        DomainError::Conflict(_) => (
            StatusCode::CONFLICT,
            ErrorResponse::new("Conflict", message, "CONFLICT"),
        ),
        DomainError::InvalidTransition(_) => (
            StatusCode::CONFLICT,
            ErrorResponse::new("Invalid Transition", message, "INVALID_TRANSITION"),
        ),
        DomainError::VerificationRequired(status) => (
            StatusCode::FORBIDDEN,
            ErrorResponse::new("Verification Required", message, "VERIFICATION_REQUIRED")
                .with_details(json!({ "verification_status": status })),
        ),
        DomainError::InsufficientCoins { required, available } => (
            StatusCode::PAYMENT_REQUIRED,
            ErrorResponse::new("Insufficient Coins", message, "INSUFFICIENT_COINS")
                .with_details(json!({ "required": required, "available": available })),
        ),
        DomainError::PaymentDeclined(_) => (
            StatusCode::PAYMENT_REQUIRED,
            ErrorResponse::new("Payment Declined", message, "PAYMENT_DECLINED"),
        ),
        DomainError::CouponRejected(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::new("Coupon Rejected", message, "COUPON_REJECTED"),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                tracing::error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "An error occurred while accessing the database".to_string(),
                        "DB_ERROR",
                    ),
                )
            }

            AppError::Validation(e) => {
                tracing::warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "Validation Error",
                        "The provided data is invalid".to_string(),
                        "VALIDATION_ERROR",
                    )
                    .with_details(json!(e)),
                )
            }

            AppError::Domain(e) => {
                tracing::info!("Regra de negócio: {}", e);
                domain_response(e)
            }

            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"),
            ),

            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::new("Forbidden", msg, "FORBIDDEN"),
            ),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("Not Found", msg, "NOT_FOUND"),
            ),

            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Conflict", msg, "CONFLICT"),
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),
            ),

            AppError::Internal(msg) => {
                tracing::error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Internal Server Error",
                        "An unexpected error occurred".to_string(),
                        "INTERNAL_ERROR",
                    ),
                )
            }

            AppError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new(
                    "Rate Limit Exceeded",
                    "Too many requests. Please try again later".to_string(),
                    "RATE_LIMIT_EXCEEDED",
                ),
            ),

            AppError::Jwt(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("JWT Error", msg, "JWT_ERROR"),
            ),

            AppError::Hash(msg) => {
                tracing::error!("❌ Hash error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Hash Error",
                        "An error occurred while processing credentials".to_string(),
                        "HASH_ERROR",
                    ),
                )
            }

            AppError::ExternalApi(msg) => {
                tracing::error!("❌ External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new(
                        "External API Error",
                        "An error occurred while communicating with external service".to_string(),
                        "EXTERNAL_API_ERROR",
                    )
                    .with_details(json!({ "external_api_error": msg })),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operações que podem falhar
pub type AppResult<T> = Result<T, AppError>;

pub fn not_found_error(resource: &str, id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

/// Erro de banco com SQLSTATE arbitrário, para testar o mapeamento
#[cfg(test)]
pub(crate) mod test_support {
    use std::borrow::Cow;
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct PgCodeError(&'static str);

    impl fmt::Display for PgCodeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "SQLSTATE {}", self.0)
        }
    }

    impl std::error::Error for PgCodeError {}

    impl DatabaseError for PgCodeError {
        fn message(&self) -> &str {
            "erro simulado"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some("bookings_no_overlap")
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                "23505" => ErrorKind::UniqueViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    pub fn database_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgCodeError(code)))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::database_error;
    use super::*;
    use crate::models::document::VerificationStatus;

    #[test]
    fn test_exclusion_violation_is_a_booking_conflict() {
        let err = AppError::from(database_error(EXCLUSION_VIOLATION));
        assert!(matches!(err, AppError::Domain(DomainError::Conflict(_))));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_serialization_failure_is_retryable_not_domain() {
        let err = AppError::from(database_error(SERIALIZATION_FAILURE));
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unmapped_database_errors_stay_internal() {
        let err = AppError::from(database_error("42P01"));
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_errors_have_distinct_codes() {
        let (status, body) =
            domain_response(DomainError::VerificationRequired(VerificationStatus::Pending));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code.as_deref(), Some("VERIFICATION_REQUIRED"));

        let (status, body) = domain_response(DomainError::InsufficientCoins {
            required: 200,
            available: 50,
        });
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(body.code.as_deref(), Some("INSUFFICIENT_COINS"));
        assert_eq!(body.details.unwrap()["available"], 50);

        let (status, body) = domain_response(DomainError::Conflict("x".into()));
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code.as_deref(), Some("CONFLICT"));
    }

    #[test]
    fn test_not_found_response_status() {
        let response = not_found_error("Booking", "abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
