//! # REST API for Invitations
//!
//! Issuing and cancelling happen on the family/invitation resources; the
//! invitee acts on the opaque token under `/invitation-tokens`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use tracing::info;

use crate::domain::error::DomainError;
use crate::io::rest::auth::CurrentUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::json::ApiJson;
use crate::io::rest::mappers::{InvitationMapper, MemberMapper};
use crate::AppState;
use shared::InviteMemberRequest;

/// Create a router for invitation related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/families/:family_id/invitations",
            get(list_family_invitations).post(invite_member),
        )
        .route("/invitations", get(list_pending_invitations))
        .route("/invitations/:invitation_id", delete(cancel_invitation))
        .route("/invitation-tokens/:token", get(get_invitation_by_token))
        .route("/invitation-tokens/:token/accept", post(accept_invitation))
        .route("/invitation-tokens/:token/decline", post(decline_invitation))
}

pub async fn invite_member(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
    ApiJson(request): ApiJson<InviteMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/families/{}/invitations - email: {}", family_id, request.email);

    let command = InvitationMapper::to_invite_command(family_id, request);
    match state.invitation_service.invite_member(&caller, command).await {
        Ok(invitation) => (StatusCode::CREATED, Json(InvitationMapper::to_dto(invitation))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn list_family_invitations(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(family_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/families/{}/invitations", family_id);

    match state.invitation_service.list_family_invitations(&caller, &family_id).await {
        Ok(invitations) => (StatusCode::OK, Json(InvitationMapper::to_dto_list(invitations))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Invitations addressed to the caller's email
pub async fn list_pending_invitations(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> impl IntoResponse {
    info!("GET /api/invitations - user: {}", caller.user_id);

    match state.invitation_service.list_pending_invitations(&caller).await {
        Ok(invitations) => (StatusCode::OK, Json(InvitationMapper::to_dto_list(invitations))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn cancel_invitation(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(invitation_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/invitations/{}", invitation_id);

    match state.invitation_service.cancel_invitation(&caller, &invitation_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Invitation not found")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Lets an invitee preview an invitation before answering it
pub async fn get_invitation_by_token(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    Path(token): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/invitation-tokens/:token");

    match state.invitation_service.get_invitation_by_token(&token).await {
        Ok(invitation) => (StatusCode::OK, Json(InvitationMapper::to_dto(invitation))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(token): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/invitation-tokens/:token/accept - user: {}", caller.user_id);

    match state.invitation_service.accept_invitation(&caller, &token).await {
        Ok(member) => (StatusCode::OK, Json(MemberMapper::to_dto(member))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(token): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/invitation-tokens/:token/decline - user: {}", caller.user_id);

    match state.invitation_service.decline_invitation(&caller, &token).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Invitation not found or expired")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
