use async_graphql::{Context, Error as GraphQLError, ErrorExtensions, Result as GraphQLResult};

use crate::domain::commands::entries::EntryListQuery;
use crate::domain::error::DomainError;
use crate::domain::identity::CallerIdentity;
use crate::io::rest::error::{public_message, status_for};
use crate::AppState;

pub(crate) fn app_state<'a>(ctx: &Context<'a>) -> GraphQLResult<&'a AppState> {
    ctx.data::<AppState>()
}

/// The caller attached by the HTTP handler, or an `UNAUTHENTICATED` error
pub(crate) fn require_caller<'a>(ctx: &Context<'a>) -> GraphQLResult<&'a CallerIdentity> {
    ctx.data_opt::<CallerIdentity>()
        .ok_or_else(|| map_domain_error(DomainError::unauthenticated("Missing bearer credential")))
}

pub(crate) fn map_domain_error(err: DomainError) -> GraphQLError {
    let status = status_for(&err).as_u16() as i32;
    let code = err.code().to_string();
    let message = public_message(&err);

    GraphQLError::new(message).extend_with(move |_, ext| {
        ext.set("code", code.clone());
        ext.set("status", status);
    })
}

pub(crate) fn entry_query(
    baby_id: Option<String>,
    family_id: Option<String>,
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
) -> EntryListQuery {
    EntryListQuery {
        baby_id,
        family_id,
        date,
        start_date,
        end_date,
    }
}
