//! # Baby Tracker Backend
//!
//! Family-shared baby tracking: families, members and invitations, babies,
//! feed entries and sleep sessions.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST + GraphQL handlers, DTO mappers)
//!     ↓
//! Domain Layer (services, authorization, validation)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Initialize the database and the domain services
//! - Set up the HTTP router with CORS and request tracing

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{
    FamilyService, FeedEntryService, IdentityResolver, InvitationService, MigrationService,
    SleepService,
};
use crate::storage::DbConnection;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub family_service: FamilyService,
    pub invitation_service: InvitationService,
    pub feed_entry_service: FeedEntryService,
    pub sleep_service: SleepService,
    pub migration_service: MigrationService,
    pub identity_resolver: IdentityResolver,
}

impl AppState {
    pub fn new(db: Arc<DbConnection>, config: &AppConfig) -> Self {
        Self {
            family_service: FamilyService::new(db.clone()),
            invitation_service: InvitationService::with_ttl(db.clone(), config.invitations.ttl()),
            feed_entry_service: FeedEntryService::new(db.clone()),
            sleep_service: SleepService::new(db.clone()),
            migration_service: MigrationService::new(db),
            identity_resolver: config.identity.resolver(),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database: {}", config.database_url);
    let db = Arc::new(DbConnection::new(&config.database_url, config.max_connections).await?);

    info!("Setting up domain model");
    let app_state = AppState::new(db, config);

    if config.migrate_legacy_on_startup {
        let report = app_state.migration_service.migrate_legacy_data().await?;
        info!("Startup legacy migration: {:?}", report);
    }

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&config.cors_origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let schema = io::graphql::build_schema(app_state.clone());

    Router::new()
        .nest("/api", io::rest::router())
        .merge(io::rest::health_apis::router())
        .merge(io::graphql::router())
        .layer(Extension(schema))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() {
        return AllowOrigin::any();
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    AllowOrigin::list(values)
}
