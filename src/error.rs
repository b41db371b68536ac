use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::DbErr;
use thiserror::Error;

/// Service-level error taxonomy.
///
/// Authorization and state-validity failures abort the whole operation;
/// the distinction between "you can't do this" (Forbidden), "not right
/// now" (InvalidState) and "already done" (AlreadyFunded / AlreadyPaid)
/// is part of the API contract.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    AlreadyFunded(String),
    #[error("{0}")]
    AlreadyPaid(String),
    #[error("{0}")]
    NoFundedEscrow(String),
    #[error("payment failed: {0}")]
    PaymentFailed(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidState(_)
            | AppError::AlreadyFunded(_)
            | AppError::AlreadyPaid(_)
            | AppError::NoFundedEscrow(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PaymentFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_distinguish_the_taxonomy() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::InvalidState("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AlreadyFunded("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NoFundedEscrow("x".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_errors_stay_internal() {
        let err = AppError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("boom"));
    }
}
