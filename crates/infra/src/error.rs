//! Infrastructure and service-level errors.

use thiserror::Error;

use storefront_core::DomainError;

/// Store operation error.
///
/// These are **infrastructure errors** (availability, concurrency, data
/// integrity) as opposed to domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or the query failed; callers may retry later.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Optimistic concurrency check failed on save.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    /// Stored data could not be mapped back into the domain.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),

    /// The caller asked for something the store cannot represent.
    #[error("invalid store operation: {0}")]
    Invalid(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => StoreError::Corrupt(value.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Error returned by cart and catalog operations to the API layer.
///
/// `NotFound`, `InvalidInput`, `Forbidden` and `Conflict` are client errors and
/// are never retried; `Transient` means a backing store was unreachable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("forbidden")]
    Forbidden,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("temporarily unavailable: {0}")]
    Transient(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::InvalidInput(msg),
            DomainError::InvalidId(msg) => ServiceError::InvalidInput(msg),
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::Unauthorized => ServiceError::Forbidden,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => ServiceError::Transient(msg),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Corrupt(msg) | StoreError::Invalid(msg) => ServiceError::Internal(msg),
        }
    }
}
