use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::onboarding::WizardError;
use crate::pricing::PricingError;
use crate::services::BackendError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Not allowed")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Backend request failed: {0}")]
    Backend(#[from] BackendError),
}

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<WizardError> for ApiError {
    fn from(e: WizardError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}
