use thiserror::Error;

use backend_domain::{DeliveryError, StoreError};

use crate::auth::TokenError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::DuplicateEmail(email) => AppError::DuplicateEmail(email),
            StoreError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            StoreError::Storage(msg) => AppError::Storage(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid => AppError::InvalidToken,
        }
    }
}
