//! # REST API for Family Management
//!
//! Families the caller belongs to, plus the membership operations that hang
//! off a family: listing members, removing them, changing roles and the
//! caller's own display name.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, put},
    Router,
};
use tracing::info;

use crate::domain::error::DomainError;
use crate::io::rest::auth::CurrentUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::json::ApiJson;
use crate::io::rest::mappers::{FamilyMapper, MemberMapper};
use crate::AppState;
use shared::{CreateFamilyRequest, UpdateDisplayNameRequest, UpdateFamilyRequest, UpdateMemberRoleRequest};

/// Create a router for family and membership APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/families", get(list_families).post(create_family))
        .route(
            "/families/:family_id",
            get(get_family).put(update_family).delete(delete_family),
        )
        .route("/families/:family_id/members", get(list_family_members))
        .route("/families/:family_id/members/:member_id", delete(remove_member))
        .route("/families/:family_id/members/:member_id/role", put(update_member_role))
        .route("/families/:family_id/display-name", put(update_my_display_name))
}

/// Families the caller owns or actively belongs to
pub async fn list_families(State(state): State<AppState>, CurrentUser(caller): CurrentUser) -> impl IntoResponse {
    info!("GET /api/families - user: {}", caller.user_id);

    match state.family_service.list_user_families(&caller).await {
        Ok(families) => (StatusCode::OK, Json(FamilyMapper::to_dto_list(families))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Create a family; the caller becomes its owner
pub async fn create_family(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(request): ApiJson<CreateFamilyRequest>,
) -> impl IntoResponse {
    info!("POST /api/families - request: {:?}", request);

    let command = FamilyMapper::to_create_command(request);
    match state.family_service.create_family(&caller, command).await {
        Ok(family) => (StatusCode::CREATED, Json(FamilyMapper::to_dto(family))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Family with its active members and babies
pub async fn get_family(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/families/{}", family_id);

    match state.family_service.get_family_details(&caller, &family_id).await {
        Ok(details) => (StatusCode::OK, Json(FamilyMapper::to_details_dto(details))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_family(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
    ApiJson(request): ApiJson<UpdateFamilyRequest>,
) -> impl IntoResponse {
    info!("PUT /api/families/{} - request: {:?}", family_id, request);

    let command = FamilyMapper::to_update_command(request);
    match state.family_service.update_family(&caller, &family_id, command).await {
        Ok(family) => (StatusCode::OK, Json(FamilyMapper::to_dto(family))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn delete_family(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/families/{}", family_id);

    match state.family_service.delete_family(&caller, &family_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Family not found")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn list_family_members(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/families/{}/members", family_id);

    match state.family_service.list_family_members(&caller, &family_id).await {
        Ok(members) => (StatusCode::OK, Json(MemberMapper::to_dto_list(members))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Soft-removes a member (owner only)
pub async fn remove_member(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((family_id, member_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/families/{}/members/{}", family_id, member_id);

    match state.family_service.remove_member(&caller, &family_id, &member_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Member not found")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_member_role(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path((family_id, member_id)): Path<(String, String)>,
    ApiJson(request): ApiJson<UpdateMemberRoleRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/families/{}/members/{}/role - role: {:?}",
        family_id, member_id, request.role
    );

    let role = MemberMapper::role_to_domain(request.role);
    match state
        .family_service
        .update_member_role(&caller, &family_id, &member_id, role)
        .await
    {
        Ok(member) => (StatusCode::OK, Json(MemberMapper::to_dto(member))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Replace the caller's own display name in this family
pub async fn update_my_display_name(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
    ApiJson(request): ApiJson<UpdateDisplayNameRequest>,
) -> impl IntoResponse {
    info!("PUT /api/families/{}/display-name", family_id);

    match state
        .family_service
        .update_my_display_name(&caller, &family_id, &request.display_name)
        .await
    {
        Ok(member) => (StatusCode::OK, Json(MemberMapper::to_dto(member))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
