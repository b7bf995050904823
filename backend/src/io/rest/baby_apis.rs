//! # REST API for Baby Management
//!
//! Babies are created inside a family and addressed by ID afterwards.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use crate::domain::error::DomainError;
use crate::io::rest::auth::CurrentUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::json::ApiJson;
use crate::io::rest::mappers::{BabyMapper, SleepSessionMapper};
use crate::AppState;
use shared::{CreateBabyRequest, UpdateBabyRequest};

/// Create a router for baby related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/families/:family_id/babies",
            get(list_family_babies).post(create_baby),
        )
        .route(
            "/babies/:baby_id",
            get(get_baby).put(update_baby).delete(delete_baby),
        )
        .route("/babies/:baby_id/active-sleep", get(get_active_sleep))
}

pub async fn list_family_babies(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/families/{}/babies", family_id);

    match state.family_service.list_family_babies(&caller, &family_id).await {
        Ok(babies) => (StatusCode::OK, Json(BabyMapper::to_dto_list(babies))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Create a baby in a family (any active member)
pub async fn create_baby(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
    ApiJson(request): ApiJson<CreateBabyRequest>,
) -> impl IntoResponse {
    info!("POST /api/families/{}/babies - request: {:?}", family_id, request);

    let command = BabyMapper::to_create_command(family_id, request);
    match state.family_service.create_baby(&caller, command).await {
        Ok(baby) => (StatusCode::CREATED, Json(BabyMapper::to_dto(baby))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn get_baby(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/babies/{}", baby_id);

    match state.family_service.get_baby(&caller, &baby_id).await {
        Ok(baby) => (StatusCode::OK, Json(BabyMapper::to_dto(baby))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_baby(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(baby_id): Path<String>,
    ApiJson(request): ApiJson<UpdateBabyRequest>,
) -> impl IntoResponse {
    info!("PUT /api/babies/{} - request: {:?}", baby_id, request);

    let command = BabyMapper::to_update_command(request);
    match state.family_service.update_baby(&caller, &baby_id, command).await {
        Ok(baby) => (StatusCode::OK, Json(BabyMapper::to_dto(baby))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Owner only; entries of the baby go with it
pub async fn delete_baby(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/babies/{}", baby_id);

    match state.family_service.delete_baby(&caller, &baby_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Baby not found")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// The baby's running sleep session, or JSON `null`
pub async fn get_active_sleep(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(baby_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/babies/{}/active-sleep", baby_id);

    match state.sleep_service.active_session(&caller, &baby_id).await {
        Ok(session) => (StatusCode::OK, Json(session.map(SleepSessionMapper::to_dto))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
