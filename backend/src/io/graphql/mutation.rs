use async_graphql::{Context, Object, Result as GraphQLResult};
use shared::{
    Baby, CreateBabyRequest, CreateFamilyRequest, CreateFeedEntryRequest, CreateSleepSessionRequest,
    Family, FamilyInvitation, FamilyMember, FamilyMemberRole, FeedEntry, InviteMemberRequest,
    SleepSession, StopSleepRequest, UpdateBabyRequest, UpdateFamilyRequest, UpdateFeedEntryRequest,
    UpdateSleepSessionRequest,
};

use crate::io::rest::mappers::{
    BabyMapper, FamilyMapper, FeedEntryMapper, InvitationMapper, MemberMapper, SleepSessionMapper,
};

use super::helpers::{app_state, map_domain_error, require_caller};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_family(&self, ctx: &Context<'_>, input: CreateFamilyRequest) -> GraphQLResult<Family> {
        let caller = require_caller(ctx)?;
        let family = app_state(ctx)?
            .family_service
            .create_family(caller, FamilyMapper::to_create_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(FamilyMapper::to_dto(family))
    }

    async fn update_family(&self, ctx: &Context<'_>, id: String, input: UpdateFamilyRequest) -> GraphQLResult<Family> {
        let caller = require_caller(ctx)?;
        let family = app_state(ctx)?
            .family_service
            .update_family(caller, &id, FamilyMapper::to_update_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(FamilyMapper::to_dto(family))
    }

    /// False when the family does not exist
    async fn delete_family(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .family_service
            .delete_family(caller, &id)
            .await
            .map_err(map_domain_error)
    }

    async fn create_baby(
        &self,
        ctx: &Context<'_>,
        family_id: String,
        input: CreateBabyRequest,
    ) -> GraphQLResult<Baby> {
        let caller = require_caller(ctx)?;
        let baby = app_state(ctx)?
            .family_service
            .create_baby(caller, BabyMapper::to_create_command(family_id, input))
            .await
            .map_err(map_domain_error)?;
        Ok(BabyMapper::to_dto(baby))
    }

    async fn update_baby(&self, ctx: &Context<'_>, id: String, input: UpdateBabyRequest) -> GraphQLResult<Baby> {
        let caller = require_caller(ctx)?;
        let baby = app_state(ctx)?
            .family_service
            .update_baby(caller, &id, BabyMapper::to_update_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(BabyMapper::to_dto(baby))
    }

    async fn delete_baby(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .family_service
            .delete_baby(caller, &id)
            .await
            .map_err(map_domain_error)
    }

    async fn remove_member(&self, ctx: &Context<'_>, family_id: String, member_id: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .family_service
            .remove_member(caller, &family_id, &member_id)
            .await
            .map_err(map_domain_error)
    }

    async fn update_member_role(
        &self,
        ctx: &Context<'_>,
        family_id: String,
        member_id: String,
        role: FamilyMemberRole,
    ) -> GraphQLResult<FamilyMember> {
        let caller = require_caller(ctx)?;
        let member = app_state(ctx)?
            .family_service
            .update_member_role(caller, &family_id, &member_id, MemberMapper::role_to_domain(role))
            .await
            .map_err(map_domain_error)?;
        Ok(MemberMapper::to_dto(member))
    }

    async fn update_my_display_name(
        &self,
        ctx: &Context<'_>,
        family_id: String,
        display_name: String,
    ) -> GraphQLResult<FamilyMember> {
        let caller = require_caller(ctx)?;
        let member = app_state(ctx)?
            .family_service
            .update_my_display_name(caller, &family_id, &display_name)
            .await
            .map_err(map_domain_error)?;
        Ok(MemberMapper::to_dto(member))
    }

    async fn invite_member(
        &self,
        ctx: &Context<'_>,
        family_id: String,
        input: InviteMemberRequest,
    ) -> GraphQLResult<FamilyInvitation> {
        let caller = require_caller(ctx)?;
        let invitation = app_state(ctx)?
            .invitation_service
            .invite_member(caller, InvitationMapper::to_invite_command(family_id, input))
            .await
            .map_err(map_domain_error)?;
        Ok(InvitationMapper::to_dto(invitation))
    }

    async fn accept_invitation(&self, ctx: &Context<'_>, token: String) -> GraphQLResult<FamilyMember> {
        let caller = require_caller(ctx)?;
        let member = app_state(ctx)?
            .invitation_service
            .accept_invitation(caller, &token)
            .await
            .map_err(map_domain_error)?;
        Ok(MemberMapper::to_dto(member))
    }

    async fn decline_invitation(&self, ctx: &Context<'_>, token: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .invitation_service
            .decline_invitation(caller, &token)
            .await
            .map_err(map_domain_error)
    }

    async fn cancel_invitation(&self, ctx: &Context<'_>, invitation_id: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .invitation_service
            .cancel_invitation(caller, &invitation_id)
            .await
            .map_err(map_domain_error)
    }

    async fn create_feed_entry(&self, ctx: &Context<'_>, input: CreateFeedEntryRequest) -> GraphQLResult<FeedEntry> {
        let caller = require_caller(ctx)?;
        let entry = app_state(ctx)?
            .feed_entry_service
            .create_feed_entry(caller, FeedEntryMapper::to_create_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(FeedEntryMapper::to_dto(entry))
    }

    async fn update_feed_entry(
        &self,
        ctx: &Context<'_>,
        id: String,
        input: UpdateFeedEntryRequest,
    ) -> GraphQLResult<FeedEntry> {
        let caller = require_caller(ctx)?;
        let entry = app_state(ctx)?
            .feed_entry_service
            .update_feed_entry(caller, &id, FeedEntryMapper::to_update_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(FeedEntryMapper::to_dto(entry))
    }

    async fn delete_feed_entry(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .feed_entry_service
            .delete_feed_entry(caller, &id)
            .await
            .map_err(map_domain_error)
    }

    async fn create_sleep_session(
        &self,
        ctx: &Context<'_>,
        input: CreateSleepSessionRequest,
    ) -> GraphQLResult<SleepSession> {
        let caller = require_caller(ctx)?;
        let session = app_state(ctx)?
            .sleep_service
            .create_sleep_session(caller, SleepSessionMapper::to_create_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(SleepSessionMapper::to_dto(session))
    }

    async fn update_sleep_session(
        &self,
        ctx: &Context<'_>,
        id: String,
        input: UpdateSleepSessionRequest,
    ) -> GraphQLResult<SleepSession> {
        let caller = require_caller(ctx)?;
        let session = app_state(ctx)?
            .sleep_service
            .update_sleep_session(caller, &id, SleepSessionMapper::to_update_command(input))
            .await
            .map_err(map_domain_error)?;
        Ok(SleepSessionMapper::to_dto(session))
    }

    /// End a running session with the client-computed duration
    async fn stop_sleep_session(
        &self,
        ctx: &Context<'_>,
        id: String,
        end_time: String,
        duration_minutes: i32,
    ) -> GraphQLResult<SleepSession> {
        let caller = require_caller(ctx)?;
        let command = SleepSessionMapper::to_stop_command(StopSleepRequest {
            end_time,
            duration_minutes,
        });
        let session = app_state(ctx)?
            .sleep_service
            .stop_sleep(caller, &id, command)
            .await
            .map_err(map_domain_error)?;
        Ok(SleepSessionMapper::to_dto(session))
    }

    async fn delete_sleep_session(&self, ctx: &Context<'_>, id: String) -> GraphQLResult<bool> {
        let caller = require_caller(ctx)?;
        app_state(ctx)?
            .sleep_service
            .delete_sleep_session(caller, &id)
            .await
            .map_err(map_domain_error)
    }
}
