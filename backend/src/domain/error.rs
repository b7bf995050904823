//! Error kinds surfaced by domain operations.
//!
//! Failures propagate unrecovered to the transport boundary, which maps each
//! kind onto an HTTP status or a GraphQL error code.

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Entity does not resolve, or an invitation token is invalid or expired
    #[error("{0}")]
    NotFound(String),

    /// Caller lacks membership, ownership or creator rights
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    /// Malformed dates/times or missing required fields
    #[error("{0}")]
    Validation(String),

    /// No usable caller identity on the request
    #[error("{0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// Stable machine-readable code shared by both transports
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::Validation(_) => "BAD_REQUEST",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast_ref::<StorageError>() {
            Some(storage_error @ StorageError::ActiveSleepExists { .. }) => {
                Self::Conflict(storage_error.to_string())
            }
            Some(StorageError::InvitationNotPending { .. }) => {
                Self::NotFound("Invitation not found or expired".to_string())
            }
            None => Self::Internal(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_conflict_becomes_domain_conflict() {
        let error = anyhow::Error::new(StorageError::ActiveSleepExists {
            baby_id: "baby-1".to_string(),
        });

        let domain_error = DomainError::from(error);

        assert!(matches!(domain_error, DomainError::Conflict(_)));
        assert_eq!(domain_error.code(), "CONFLICT");
    }

    #[test]
    fn test_other_storage_failures_are_internal() {
        let domain_error = DomainError::from(anyhow::anyhow!("disk I/O error"));

        assert!(matches!(domain_error, DomainError::Internal(_)));
        assert_eq!(domain_error.code(), "INTERNAL_SERVER_ERROR");
    }
}
