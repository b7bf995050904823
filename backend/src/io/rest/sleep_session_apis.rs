//! # REST API for Sleep Sessions
//!
//! Same list filters as the feed entries, plus `POST /:id/stop` to end a
//! running session.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::domain::error::DomainError;
use crate::io::rest::auth::CurrentUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::json::ApiJson;
use crate::io::rest::feed_entry_apis::EntryListParams;
use crate::io::rest::mappers::SleepSessionMapper;
use crate::AppState;
use shared::{CreateSleepSessionRequest, StopSleepRequest, UpdateSleepSessionRequest};

/// Create a router for sleep session APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sleep-sessions", get(list_sleep_sessions).post(create_sleep_session))
        .route(
            "/sleep-sessions/:session_id",
            get(get_sleep_session)
                .put(update_sleep_session)
                .delete(delete_sleep_session),
        )
        .route("/sleep-sessions/:session_id/stop", post(stop_sleep_session))
}

pub async fn list_sleep_sessions(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(params): Query<EntryListParams>,
) -> impl IntoResponse {
    info!("GET /api/sleep-sessions - query: {:?}", params);

    match state.sleep_service.list_sleep_sessions(&caller, params.into()).await {
        Ok(sessions) => (StatusCode::OK, Json(SleepSessionMapper::to_dto_list(sessions))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Start (or record) a sleep session. 409 when the baby is already asleep.
pub async fn create_sleep_session(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(request): ApiJson<CreateSleepSessionRequest>,
) -> impl IntoResponse {
    info!("POST /api/sleep-sessions - request: {:?}", request);

    let command = SleepSessionMapper::to_create_command(request);
    match state.sleep_service.create_sleep_session(&caller, command).await {
        Ok(session) => (StatusCode::CREATED, Json(SleepSessionMapper::to_dto(session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn get_sleep_session(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/sleep-sessions/{}", session_id);

    match state.sleep_service.get_sleep_session(&caller, &session_id).await {
        Ok(session) => (StatusCode::OK, Json(SleepSessionMapper::to_dto(session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_sleep_session(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(session_id): Path<String>,
    ApiJson(request): ApiJson<UpdateSleepSessionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/sleep-sessions/{} - request: {:?}", session_id, request);

    let command = SleepSessionMapper::to_update_command(request);
    match state.sleep_service.update_sleep_session(&caller, &session_id, command).await {
        Ok(session) => (StatusCode::OK, Json(SleepSessionMapper::to_dto(session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn stop_sleep_session(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(session_id): Path<String>,
    ApiJson(request): ApiJson<StopSleepRequest>,
) -> impl IntoResponse {
    info!("POST /api/sleep-sessions/{}/stop - request: {:?}", session_id, request);

    let command = SleepSessionMapper::to_stop_command(request);
    match state.sleep_service.stop_sleep(&caller, &session_id, command).await {
        Ok(session) => (StatusCode::OK, Json(SleepSessionMapper::to_dto(session))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn delete_sleep_session(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/sleep-sessions/{}", session_id);

    match state.sleep_service.delete_sleep_session(&caller, &session_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Sleep session not found")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
