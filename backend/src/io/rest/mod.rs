//! # REST API Interface Layer
//!
//! HTTP endpoints under `/api`. This layer handles:
//! - Caller resolution from the `Authorization` header
//! - JSON request/response translation through the mappers
//! - Error translation from domain errors to status codes
//!
//! Creates answer 201, successful deletes 204, and deletes that find
//! nothing 404.

pub mod auth;
pub mod baby_apis;
pub mod error;
pub mod family_apis;
pub mod feed_entry_apis;
pub mod health_apis;
pub mod invitation_apis;
pub mod json;
pub mod mappers;
pub mod sleep_session_apis;

use axum::Router;

use crate::AppState;

/// All `/api` routes
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(family_apis::router())
        .merge(baby_apis::router())
        .merge(invitation_apis::router())
        .merge(feed_entry_apis::router())
        .merge(sleep_session_apis::router())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::identity::tests::token_for;
    use crate::storage::DbConnection;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup_test_router() -> axum::Router {
        let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
        let config = AppConfig::default();
        crate::create_router(crate::AppState::new(db, &config), &config)
    }

    fn bearer(user_id: &str, email: &str) -> String {
        format!("Bearer {}", token_for(json!({ "sub": user_id, "email": email })))
    }

    async fn send(router: &axum::Router, method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_credentials() {
        let router = setup_test_router().await;

        let response = send(&router, "GET", "/health", None, None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_credentials_are_401() {
        let router = setup_test_router().await;

        let response = send(&router, "GET", "/api/families", None, None).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_family_baby_and_feed_entry_flow() {
        let router = setup_test_router().await;
        let alice = bearer("alice", "alice@example.com");
        let mallory = bearer("mallory", "mallory@example.com");

        let response = send(&router, "POST", "/api/families", Some(&alice), Some(json!({ "name": "Home" }))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let family = json_body(response).await;
        let family_id = family["id"].as_str().unwrap().to_string();
        assert_eq!(family["ownerId"], "alice");

        let response = send(
            &router,
            "POST",
            &format!("/api/families/{}/babies", family_id),
            Some(&alice),
            Some(json!({ "name": "Lily", "birthDate": "2024-01-15", "gender": "FEMALE" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let baby_id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = send(
            &router,
            "POST",
            "/api/feed-entries",
            Some(&alice),
            Some(json!({
                "babyId": baby_id,
                "date": "2024-03-01",
                "time": "07:30",
                "feedType": "BOTTLE",
                "didPee": true
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let entry = json_body(response).await;
        assert_eq!(entry["time"], "07:30");
        assert_eq!(entry["didPoo"], false);

        let uri = format!("/api/feed-entries?babyId={}&date=2024-03-01", baby_id);
        let response = send(&router, "GET", &uri, Some(&alice), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);

        let response = send(&router, "GET", &uri, Some(&mallory), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["code"], "FORBIDDEN");

        let response = send(&router, "GET", &format!("/api/families/{}", family_id), Some(&alice), None).await;
        let details = json_body(response).await;
        assert_eq!(details["members"][0]["role"], "OWNER");
        assert_eq!(details["babies"][0]["name"], "Lily");

        let entry_uri = format!("/api/feed-entries/{}", entry["id"].as_str().unwrap());
        let response = send(&router, "DELETE", &entry_uri, Some(&alice), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&router, "DELETE", &entry_uri, Some(&alice), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invitation_and_sleep_conflict_over_http() {
        let router = setup_test_router().await;
        let alice = bearer("alice", "alice@example.com");
        let bob = bearer("bob", "bob@example.com");

        let family = json_body(send(&router, "POST", "/api/families", Some(&alice), Some(json!({ "name": "Home" }))).await).await;
        let family_id = family["id"].as_str().unwrap().to_string();
        let baby = json_body(
            send(
                &router,
                "POST",
                &format!("/api/families/{}/babies", family_id),
                Some(&alice),
                Some(json!({ "name": "Lily" })),
            )
            .await,
        )
        .await;
        let baby_id = baby["id"].as_str().unwrap().to_string();

        let response = send(
            &router,
            "POST",
            &format!("/api/families/{}/invitations", family_id),
            Some(&alice),
            Some(json!({ "email": "Bob@Example.com" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let invitation = json_body(response).await;
        assert_eq!(invitation["email"], "bob@example.com");
        assert_eq!(invitation["role"], "PARENT");

        let pending = json_body(send(&router, "GET", "/api/invitations", Some(&bob), None).await).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let token = invitation["token"].as_str().unwrap();
        let response = send(&router, "POST", &format!("/api/invitation-tokens/{}/accept", token), Some(&bob), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["displayName"], "New Member");

        let start = json!({ "babyId": baby_id, "date": "2024-03-01", "startTime": "20:00", "isActive": true });
        let response = send(&router, "POST", "/api/sleep-sessions", Some(&bob), Some(start.clone())).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let session_id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = send(&router, "POST", "/api/sleep-sessions", Some(&alice), Some(start)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = send(
            &router,
            "POST",
            &format!("/api/sleep-sessions/{}/stop", session_id),
            Some(&alice),
            Some(json!({ "endTime": "21:15", "durationMinutes": 75 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stopped = json_body(response).await;
        assert_eq!(stopped["isActive"], false);
        assert_eq!(stopped["durationMinutes"], 75);

        let active = json_body(send(&router, "GET", &format!("/api/babies/{}/active-sleep", baby_id), Some(&bob), None).await).await;
        assert!(active.is_null());
    }

    #[tokio::test]
    async fn test_bad_dates_are_400() {
        let router = setup_test_router().await;
        let alice = bearer("alice", "alice@example.com");

        let response = send(&router, "GET", "/api/feed-entries?date=2024-03-01", Some(&alice), None).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }
    #[tokio::test]
    async fn test_missing_body_fields_are_400() {
        let router = setup_test_router().await;
        let alice = bearer("alice", "alice@example.com");

        let response = send(
            &router,
            "POST",
            "/api/feed-entries",
            Some(&alice),
            Some(json!({ "date": "2024-01-01", "time": "07:00", "feedType": "BOTTLE" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(body["message"].as_str().unwrap().contains("babyId"));

        let response = send(&router, "POST", "/api/families", Some(&alice), Some(json!({ "nom": "x" }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_caregiver_cannot_read_invitation_tokens() {
        let router = setup_test_router().await;
        let alice = bearer("alice", "alice@example.com");
        let carol = bearer("carol", "carol@example.com");

        let family = json_body(send(&router, "POST", "/api/families", Some(&alice), Some(json!({ "name": "Home" }))).await).await;
        let invitations_uri = format!("/api/families/{}/invitations", family["id"].as_str().unwrap());

        let invitation = json_body(
            send(
                &router,
                "POST",
                &invitations_uri,
                Some(&alice),
                Some(json!({ "email": "carol@example.com", "role": "CAREGIVER" })),
            )
            .await,
        )
        .await;
        let accept_uri = format!("/api/invitation-tokens/{}/accept", invitation["token"].as_str().unwrap());
        let response = send(&router, "POST", &accept_uri, Some(&carol), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &router,
            "POST",
            &invitations_uri,
            Some(&alice),
            Some(json!({ "email": "bob@example.com", "role": "PARENT" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&router, "GET", &invitations_uri, Some(&carol), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["code"], "FORBIDDEN");

        let response = send(&router, "GET", &invitations_uri, Some(&alice), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }
}
