//! JSON body extraction with domain-style rejections.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::error::DomainError;
use crate::io::rest::error::ApiError;

/// Like [`Json`], but a body that is not valid JSON or misses a required
/// field is rejected as a `BAD_REQUEST` [`ApiError`].
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                warn!("Rejecting request body: {}", rejection.body_text());
                Err(ApiError::from(validation_error(rejection)))
            }
        }
    }
}

fn validation_error(rejection: JsonRejection) -> DomainError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            DomainError::validation("Expected request with `Content-Type: application/json`")
        }
        other => DomainError::validation(other.body_text()),
    }
}
