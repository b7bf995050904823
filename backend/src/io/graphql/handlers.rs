use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql::Value;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Extension,
};
use tracing::{debug, info, warn};

use crate::io::rest::auth::resolve_caller;
use crate::io::rest::error::status_for_code;
use crate::AppState;

use super::BabyTrackerSchema;

/// Executes a GraphQL request. The HTTP status follows the `code` extension
/// of the first error, so clients see the same statuses as over REST.
pub async fn graphql_handler(
    Extension(schema): Extension<BabyTrackerSchema>,
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> Response {
    let mut request = req.into_inner();

    match resolve_caller(&state.identity_resolver, &headers) {
        Ok(caller) => {
            debug!("GraphQL request from {}", caller.user_id);
            request = request.data(caller);
        }
        Err(e) => debug!("GraphQL request without caller: {}", e),
    }

    let operation = request
        .operation_name
        .clone()
        .unwrap_or_else(|| "anonymous".to_string());
    info!("POST /graphql - operation: {}", operation);

    let execution = schema.execute(request).await;

    for error in &execution.errors {
        warn!("GraphQL operation {} returned error: {}", operation, error.message);
    }

    let status = match execution.errors.first() {
        None => StatusCode::OK,
        Some(error) => match error.extensions.as_ref().and_then(|ext| ext.get("code")) {
            Some(Value::String(code)) => status_for_code(code),
            _ => StatusCode::BAD_REQUEST,
        },
    };

    let mut response = GraphQLResponse::from(execution).into_response();
    *response.status_mut() = status;
    response
}

pub async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
