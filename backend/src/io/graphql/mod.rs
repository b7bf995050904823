//! # GraphQL Interface
//!
//! `POST /graphql` executes queries and mutations; `GET /graphql` serves the
//! playground. Resolvers call the same domain services as the REST handlers
//! and return the same DTOs.

mod handlers;
mod helpers;
mod mutation;
mod query;
mod schema;

use axum::{routing::get, Router};

use crate::AppState;

pub use handlers::{graphql_handler, graphql_playground};
pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use schema::{build_schema, BabyTrackerSchema};

pub fn router() -> Router<AppState> {
    Router::new().route("/graphql", get(graphql_playground).post(graphql_handler))
}

#[cfg(test)]
mod tests {
    use super::helpers::map_domain_error;
    use crate::config::AppConfig;
    use crate::domain::error::DomainError;
    use crate::domain::identity::tests::token_for;
    use crate::storage::DbConnection;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, to_value, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_test_router() -> axum::Router {
        let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
        let config = AppConfig::default();
        crate::create_router(crate::AppState::new(db, &config), &config)
    }

    async fn execute(router: &axum::Router, user_id: Option<&str>, query: &str, variables: Value) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header("content-type", "application/json");
        if let Some(user_id) = user_id {
            let token = token_for(json!({ "sub": user_id, "email": format!("{}@example.com", user_id) }));
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = json!({ "query": query, "variables": variables }).to_string();
        router.clone().oneshot(builder.body(Body::from(body)).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_extensions_carry_code() {
        let error = map_domain_error(DomainError::conflict("already asleep"));
        assert_eq!(error.message, "already asleep");

        let extensions = to_value(error.extensions.clone().expect("extensions present")).unwrap();
        assert_eq!(extensions["code"], "CONFLICT");
        assert_eq!(extensions["status"], 409);
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let error = map_domain_error(DomainError::Internal(anyhow::anyhow!("disk full")));

        assert_eq!(error.message, "An internal error occurred.");
    }

    #[tokio::test]
    async fn test_create_family_and_baby_through_graphql() {
        let router = setup_test_router().await;

        let response = execute(
            &router,
            Some("alice"),
            "mutation($input: CreateFamilyInput!) { createFamily(input: $input) { id name ownerId } }",
            json!({ "input": { "name": "Home" } }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let family_id = body["data"]["createFamily"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["createFamily"]["ownerId"], "alice");

        let response = execute(
            &router,
            Some("alice"),
            "mutation($familyId: String!, $input: CreateBabyInput!) { createBaby(familyId: $familyId, input: $input) { id name gender } }",
            json!({ "familyId": family_id, "input": { "name": "Lily" } }),
        )
        .await;
        let body = json_body(response).await;
        assert_eq!(body["data"]["createBaby"]["gender"], "UNKNOWN");

        let response = execute(
            &router,
            Some("alice"),
            "query($id: String!) { family(id: $id) { family { name } members { role } babies { name } } }",
            json!({ "id": family_id }),
        )
        .await;
        let body = json_body(response).await;
        assert_eq!(body["data"]["family"]["members"][0]["role"], "OWNER");
        assert_eq!(body["data"]["family"]["babies"][0]["name"], "Lily");
    }

    #[tokio::test]
    async fn test_error_codes_drive_http_status() {
        let router = setup_test_router().await;

        let response = execute(&router, None, "{ families { id } }", json!({})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["errors"][0]["extensions"]["code"], "UNAUTHENTICATED");

        let response = execute(
            &router,
            Some("alice"),
            "query($id: String!) { family(id: $id) { family { id } } }",
            json!({ "id": "missing" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
