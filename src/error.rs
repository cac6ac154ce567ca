use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::token::TokenError;

/// Every failure a handler can surface, mapped onto the HTTP statuses the
/// client understands. The response body is always `{ "error": <message> }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Email is already registered!")]
    DuplicateIdentity,
    #[error("Wrong email or password!")]
    InvalidCredentials,
    #[error("Please authenticate using a valid token")]
    AuthRequired,
    #[error("Invalid Token!")]
    InvalidToken(#[from] TokenError),
    #[error("{0} not found!")]
    NotFound(&'static str),
    #[error("Access Denied: Not your record")]
    Forbidden,
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateIdentity
            | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::AuthRequired | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
