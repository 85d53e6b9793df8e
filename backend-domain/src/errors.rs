use thiserror::Error;

/// Failures surfaced by the record store and the staff directory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// Any failure while relaying a file to the mail recipient (auth, network,
/// rejected recipient). Callers only ever see this one shape.
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);
