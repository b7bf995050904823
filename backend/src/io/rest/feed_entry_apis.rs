//! # REST API for Feed Entries
//!
//! `GET /api/feed-entries` narrows by query parameters:
//! `?babyId=` (optionally with `date=` or `start=`/`end=`), `?familyId=`, or
//! nothing for every family the caller belongs to.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::domain::commands::entries::EntryListQuery;
use crate::domain::error::DomainError;
use crate::io::rest::auth::CurrentUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::json::ApiJson;
use crate::io::rest::mappers::FeedEntryMapper;
use crate::AppState;
use shared::{CreateFeedEntryRequest, UpdateFeedEntryRequest};

/// Query parameters for the entry list endpoints (feed and sleep)
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntryListParams {
    pub baby_id: Option<String>,
    pub family_id: Option<String>,
    pub date: Option<String>,
    #[serde(alias = "startDate")]
    pub start: Option<String>,
    #[serde(alias = "endDate")]
    pub end: Option<String>,
}

impl From<EntryListParams> for EntryListQuery {
    fn from(params: EntryListParams) -> Self {
        EntryListQuery {
            baby_id: params.baby_id,
            family_id: params.family_id,
            date: params.date,
            start_date: params.start,
            end_date: params.end,
        }
    }
}

/// Create a router for feed entry APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed-entries", get(list_feed_entries).post(create_feed_entry))
        .route(
            "/feed-entries/:entry_id",
            get(get_feed_entry).put(update_feed_entry).delete(delete_feed_entry),
        )
}

pub async fn list_feed_entries(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Query(params): Query<EntryListParams>,
) -> impl IntoResponse {
    info!("GET /api/feed-entries - query: {:?}", params);

    match state.feed_entry_service.list_feed_entries(&caller, params.into()).await {
        Ok(entries) => (StatusCode::OK, Json(FeedEntryMapper::to_dto_list(entries))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn create_feed_entry(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(request): ApiJson<CreateFeedEntryRequest>,
) -> impl IntoResponse {
    info!("POST /api/feed-entries - request: {:?}", request);

    let command = FeedEntryMapper::to_create_command(request);
    match state.feed_entry_service.create_feed_entry(&caller, command).await {
        Ok(entry) => (StatusCode::CREATED, Json(FeedEntryMapper::to_dto(entry))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn get_feed_entry(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/feed-entries/{}", entry_id);

    match state.feed_entry_service.get_feed_entry(&caller, &entry_id).await {
        Ok(entry) => (StatusCode::OK, Json(FeedEntryMapper::to_dto(entry))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn update_feed_entry(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(entry_id): Path<String>,
    ApiJson(request): ApiJson<UpdateFeedEntryRequest>,
) -> impl IntoResponse {
    info!("PUT /api/feed-entries/{} - request: {:?}", entry_id, request);

    let command = FeedEntryMapper::to_update_command(request);
    match state.feed_entry_service.update_feed_entry(&caller, &entry_id, command).await {
        Ok(entry) => (StatusCode::OK, Json(FeedEntryMapper::to_dto(entry))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn delete_feed_entry(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/feed-entries/{}", entry_id);

    match state.feed_entry_service.delete_feed_entry(&caller, &entry_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => ApiError::from(DomainError::not_found("Feed entry not found")).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
