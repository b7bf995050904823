use async_graphql::{Context, Object, Result as GraphQLResult};
use shared::{Baby, Family, FamilyDetails, FamilyInvitation, FamilyMember, FeedEntry, SleepSession};

use crate::io::rest::mappers::{
    BabyMapper, FamilyMapper, FeedEntryMapper, InvitationMapper, MemberMapper, SleepSessionMapper,
};

use super::helpers::{app_state, entry_query, map_domain_error, require_caller};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Families the caller owns or actively belongs to
    async fn families(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<Family>> {
        let caller = require_caller(ctx)?;
        let families = app_state(ctx)?
            .family_service
            .list_user_families(caller)
            .await
            .map_err(map_domain_error)?;
        Ok(FamilyMapper::to_dto_list(families))
    }

    async fn family(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<FamilyDetails> {
        let caller = require_caller(ctx)?;
        let details = app_state(ctx)?
            .family_service
            .get_family_details(caller, &id)
            .await
            .map_err(map_domain_error)?;
        Ok(FamilyMapper::to_details_dto(details))
    }

    async fn family_members(&self, ctx: &Context<'_>, family_id: String) -> GraphQLResult<Vec<FamilyMember>> {
        let caller = require_caller(ctx)?;
        let members = app_state(ctx)?
            .family_service
            .list_family_members(caller, &family_id)
            .await
            .map_err(map_domain_error)?;
        Ok(MemberMapper::to_dto_list(members))
    }

    async fn babies(&self, ctx: &Context<'_>, family_id: String) -> GraphQLResult<Vec<Baby>> {
        let caller = require_caller(ctx)?;
        let babies = app_state(ctx)?
            .family_service
            .list_family_babies(caller, &family_id)
            .await
            .map_err(map_domain_error)?;
        Ok(BabyMapper::to_dto_list(babies))
    }

    async fn baby(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<Baby> {
        let caller = require_caller(ctx)?;
        let baby = app_state(ctx)?
            .family_service
            .get_baby(caller, &id)
            .await
            .map_err(map_domain_error)?;
        Ok(BabyMapper::to_dto(baby))
    }

    /// Invitations addressed to the caller's email
    async fn pending_invitations(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<FamilyInvitation>> {
        let caller = require_caller(ctx)?;
        let invitations = app_state(ctx)?
            .invitation_service
            .list_pending_invitations(caller)
            .await
            .map_err(map_domain_error)?;
        Ok(InvitationMapper::to_dto_list(invitations))
    }

    async fn family_invitations(&self, ctx: &Context<'_>, family_id: String) -> GraphQLResult<Vec<FamilyInvitation>> {
        let caller = require_caller(ctx)?;
        let invitations = app_state(ctx)?
            .invitation_service
            .list_family_invitations(caller, &family_id)
            .await
            .map_err(map_domain_error)?;
        Ok(InvitationMapper::to_dto_list(invitations))
    }

    async fn invitation(&self, ctx: &Context<'_>, token: String) -> GraphQLResult<FamilyInvitation> {
        require_caller(ctx)?;
        let invitation = app_state(ctx)?
            .invitation_service
            .get_invitation_by_token(&token)
            .await
            .map_err(map_domain_error)?;
        Ok(InvitationMapper::to_dto(invitation))
    }

    async fn feed_entries(
        &self,
        ctx: &Context<'_>,
        baby_id: Option<String>,
        family_id: Option<String>,
        date: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> GraphQLResult<Vec<FeedEntry>> {
        let caller = require_caller(ctx)?;
        let query = entry_query(baby_id, family_id, date, start_date, end_date);
        let entries = app_state(ctx)?
            .feed_entry_service
            .list_feed_entries(caller, query)
            .await
            .map_err(map_domain_error)?;
        Ok(FeedEntryMapper::to_dto_list(entries))
    }

    async fn feed_entry(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<FeedEntry> {
        let caller = require_caller(ctx)?;
        let entry = app_state(ctx)?
            .feed_entry_service
            .get_feed_entry(caller, &id)
            .await
            .map_err(map_domain_error)?;
        Ok(FeedEntryMapper::to_dto(entry))
    }

    async fn sleep_sessions(
        &self,
        ctx: &Context<'_>,
        baby_id: Option<String>,
        family_id: Option<String>,
        date: Option<String>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> GraphQLResult<Vec<SleepSession>> {
        let caller = require_caller(ctx)?;
        let query = entry_query(baby_id, family_id, date, start_date, end_date);
        let sessions = app_state(ctx)?
            .sleep_service
            .list_sleep_sessions(caller, query)
            .await
            .map_err(map_domain_error)?;
        Ok(SleepSessionMapper::to_dto_list(sessions))
    }

    async fn sleep_session(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<SleepSession> {
        let caller = require_caller(ctx)?;
        let session = app_state(ctx)?
            .sleep_service
            .get_sleep_session(caller, &id)
            .await
            .map_err(map_domain_error)?;
        Ok(SleepSessionMapper::to_dto(session))
    }

    /// The baby's running sleep session, if any
    async fn active_sleep_session(&self, ctx: &Context<'_>, baby_id: String) -> GraphQLResult<Option<SleepSession>> {
        let caller = require_caller(ctx)?;
        let session = app_state(ctx)?
            .sleep_service
            .active_session(caller, &baby_id)
            .await
            .map_err(map_domain_error)?;
        Ok(session.map(SleepSessionMapper::to_dto))
    }
}
