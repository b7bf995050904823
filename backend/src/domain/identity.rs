//! Caller identity resolution.
//!
//! Credentials are validated upstream by the identity provider; this module
//! only reads the stable subject identifier (and email, when present) from
//! the claims of an already-validated bearer token. The resolved identity is
//! passed explicitly into every domain operation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::validation::MAX_NAME_LENGTH;

/// The authenticated caller of a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    /// Lower-cased email claim, if the credential carries one
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into().trim().to_lowercase());
        self
    }

    pub fn with_display_name(mut self, name: impl AsRef<str>) -> Self {
        let name: String = name.as_ref().trim().chars().take(MAX_NAME_LENGTH).collect();
        self.display_name = Some(name).filter(|name| !name.is_empty());
        self
    }

    /// Name for a new membership row when the caller did not choose one
    pub fn display_name_or(&self, fallback: &str) -> String {
        self.display_name.as_deref().unwrap_or(fallback).to_string()
    }
}

/// Maps a credential to a [`CallerIdentity`]. Pure: no state, no I/O.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    user_id_claims: Vec<String>,
    email_claims: Vec<String>,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(
            vec!["oid".to_string(), "sub".to_string()],
            vec![
                "email".to_string(),
                "preferred_username".to_string(),
                "upn".to_string(),
            ],
        )
    }
}

impl IdentityResolver {
    /// Claims are consulted in the given order; the first non-empty string wins.
    pub fn new(user_id_claims: Vec<String>, email_claims: Vec<String>) -> Self {
        Self {
            user_id_claims,
            email_claims,
        }
    }

    /// Resolve from a raw `Authorization` header value
    pub fn resolve(&self, header: Option<&str>) -> DomainResult<CallerIdentity> {
        let header = header.ok_or_else(|| DomainError::unauthenticated("Missing bearer credential"))?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| DomainError::unauthenticated("Authorization header is not a bearer credential"))?;

        self.resolve_bearer_token(token)
    }

    /// Resolve from a compact JWT (`header.payload.signature`)
    pub fn resolve_bearer_token(&self, token: &str) -> DomainResult<CallerIdentity> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next()) {
            (Some(_), Some(payload)) if !payload.is_empty() => payload,
            _ => return Err(DomainError::unauthenticated("Malformed bearer credential")),
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| DomainError::unauthenticated("Malformed bearer credential"))?;
        let claims: Value = serde_json::from_slice(&bytes)
            .map_err(|_| DomainError::unauthenticated("Malformed bearer credential"))?;

        match claims {
            Value::Object(claims) => self.resolve_claims(&claims),
            _ => Err(DomainError::unauthenticated("Malformed bearer credential")),
        }
    }

    pub fn resolve_claims(&self, claims: &Map<String, Value>) -> DomainResult<CallerIdentity> {
        let user_id = first_string_claim(claims, &self.user_id_claims)
            .ok_or_else(|| DomainError::unauthenticated("User ID not found in claims"))?;

        let mut identity = CallerIdentity::new(user_id);
        if let Some(email) = first_string_claim(claims, &self.email_claims) {
            identity = identity.with_email(email);
        }
        if let Some(name) = claims.get("name").and_then(Value::as_str) {
            identity = identity.with_display_name(name);
        }

        Ok(identity)
    }
}

fn first_string_claim<'a>(claims: &'a Map<String, Value>, names: &[String]) -> Option<&'a str> {
    names
        .iter()
        .filter_map(|name| claims.get(name).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}
