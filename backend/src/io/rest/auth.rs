//! Caller extraction for REST handlers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::domain::error::DomainResult;
use crate::domain::identity::{CallerIdentity, IdentityResolver};
use crate::io::rest::error::ApiError;
use crate::AppState;

/// The resolved caller of the current request. Rejects with 401 when the
/// request carries no usable bearer credential.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub CallerIdentity);

/// Resolve the caller from the `Authorization` header
pub fn resolve_caller(resolver: &IdentityResolver, headers: &HeaderMap) -> DomainResult<CallerIdentity> {
    let header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    resolver.resolve(header)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_caller(&state.identity_resolver, &parts.headers) {
            Ok(caller) => Ok(CurrentUser(caller)),
            Err(e) => {
                warn!("Rejecting unauthenticated request to {}: {}", parts.uri.path(), e);
                Err(ApiError::from(e))
            }
        }
    }
}
