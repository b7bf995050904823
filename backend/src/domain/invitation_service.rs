//! Invitation lifecycle: `Pending -> {Accepted, Declined, Expired}`.
//!
//! Tokens are capabilities. Whoever presents a pending, unexpired token may
//! accept it; the membership is created for the caller's own identity.

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::invitations::InviteMemberCommand;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::CallerIdentity;
use crate::domain::models::{
    FamilyInvitation, FamilyMember, FamilyMemberRole, InvitationStatus, MembershipStatus,
};
use crate::domain::validation::{normalize_email, optional_text, MAX_TEXT_LENGTH};
use crate::storage::traits::{FamilyStorage, InvitationStorage, MemberStorage};
use crate::storage::{DbConnection, FamilyRepository, InvitationRepository, MemberRepository};

pub const DEFAULT_INVITATION_TTL_DAYS: i64 = 7;

/// Service for issuing and consuming family invitations
#[derive(Clone)]
pub struct InvitationService {
    family_repository: FamilyRepository,
    member_repository: MemberRepository,
    invitation_repository: InvitationRepository,
    ttl: Duration,
}

impl InvitationService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self::with_ttl(db, Duration::days(DEFAULT_INVITATION_TTL_DAYS))
    }

    /// Invitations expire `ttl` after they are issued or refreshed
    pub fn with_ttl(db: Arc<DbConnection>, ttl: Duration) -> Self {
        Self {
            family_repository: FamilyRepository::new((*db).clone()),
            member_repository: MemberRepository::new((*db).clone()),
            invitation_repository: InvitationRepository::new((*db).clone()),
            ttl,
        }
    }

    /// Invite an email address into a family, or refresh the pending
    /// invitation already addressed to it
    pub async fn invite_member(
        &self,
        caller: &CallerIdentity,
        command: InviteMemberCommand,
    ) -> DomainResult<FamilyInvitation> {
        info!("Inviting {} into family {}", command.email, command.family_id);

        self.require_inviter(caller, &command.family_id).await?;

        let email = normalize_email(&command.email)?;
        let role = command.role.unwrap_or(FamilyMemberRole::Parent);
        if role == FamilyMemberRole::Owner {
            return Err(DomainError::validation("Cannot invite a member as Owner"));
        }
        let message = optional_text("Message", command.message.as_deref(), MAX_TEXT_LENGTH)?;

        if self
            .member_repository
            .find_active_member_by_email(&command.family_id, &email)
            .await?
            .is_some()
        {
            warn!("{} is already an active member of family {}", email, command.family_id);
            return Err(DomainError::conflict("This person is already a member of the family"));
        }

        let now = Utc::now();
        if let Some(mut invitation) = self
            .invitation_repository
            .find_pending_invitation(&command.family_id, &email)
            .await?
        {
            invitation.role = role;
            invitation.message = message;
            invitation.invited_by = caller.user_id.clone();
            invitation.expires_at = now + self.ttl;
            invitation.updated_at = Some(now);
            self.invitation_repository.update_invitation(&invitation).await?;

            info!("Refreshed invitation {} for {}", invitation.id, email);
            return Ok(invitation);
        }

        let invitation = FamilyInvitation {
            id: FamilyInvitation::generate_id(),
            family_id: command.family_id,
            email,
            invited_by: caller.user_id.clone(),
            role,
            status: InvitationStatus::Pending,
            message,
            token: FamilyInvitation::generate_token(),
            expires_at: now + self.ttl,
            created_at: now,
            updated_at: None,
        };
        self.invitation_repository.store_invitation(&invitation).await?;

        info!("Created invitation {} for {}", invitation.id, invitation.email);
        Ok(invitation)
    }

    /// Join the invitation's family as the caller
    pub async fn accept_invitation(&self, caller: &CallerIdentity, token: &str) -> DomainResult<FamilyMember> {
        info!("User {} accepting invitation", caller.user_id);

        let now = Utc::now();
        let mut invitation = self
            .invitation_repository
            .get_invitation_by_token(token)
            .await?
            .filter(|invitation| invitation.is_acceptable_at(now))
            .ok_or_else(|| {
                warn!("Invitation token is unknown, consumed or expired");
                DomainError::not_found("Invitation not found or expired")
            })?;

        if let Some(existing) = self
            .member_repository
            .get_member_by_user(&invitation.family_id, &caller.user_id)
            .await?
        {
            if existing.is_active() {
                warn!("User {} is already a member of family {}", caller.user_id, invitation.family_id);
                return Err(DomainError::conflict("You are already a member of this family"));
            }
        }

        let member = FamilyMember {
            id: FamilyMember::generate_id(),
            family_id: invitation.family_id.clone(),
            user_id: caller.user_id.clone(),
            display_name: caller.display_name_or(FamilyMember::INVITED_DISPLAY_NAME),
            email: caller.email.clone(),
            role: invitation.role,
            status: MembershipStatus::Active,
            invited_by: Some(invitation.invited_by.clone()),
            created_at: now,
            updated_at: None,
        };
        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = Some(now);

        let member = self.invitation_repository.accept_invitation(&invitation, &member).await?;

        info!("User {} joined family {} as {}", member.user_id, member.family_id, member.role);
        Ok(member)
    }

    /// Returns false unless a pending invitation was declined
    pub async fn decline_invitation(&self, caller: &CallerIdentity, token: &str) -> DomainResult<bool> {
        info!("User {} declining invitation", caller.user_id);

        let mut invitation = match self.invitation_repository.get_invitation_by_token(token).await? {
            Some(invitation) if invitation.is_pending() => invitation,
            _ => {
                warn!("No pending invitation for token");
                return Ok(false);
            }
        };

        invitation.status = InvitationStatus::Declined;
        invitation.updated_at = Some(Utc::now());
        self.invitation_repository.update_invitation(&invitation).await?;

        info!("Declined invitation {}", invitation.id);
        Ok(true)
    }

    /// Inviter-only. Expires the invitation whatever its current status.
    pub async fn cancel_invitation(&self, caller: &CallerIdentity, invitation_id: &str) -> DomainResult<bool> {
        info!("User {} cancelling invitation {}", caller.user_id, invitation_id);

        let mut invitation = match self.invitation_repository.get_invitation(invitation_id).await? {
            Some(invitation) => invitation,
            None => {
                warn!("Invitation not found: {}", invitation_id);
                return Ok(false);
            }
        };
        if invitation.invited_by != caller.user_id {
            warn!("User {} did not issue invitation {}", caller.user_id, invitation_id);
            return Err(DomainError::unauthorized("Only the inviter can cancel this invitation"));
        }

        invitation.status = InvitationStatus::Expired;
        invitation.updated_at = Some(Utc::now());
        self.invitation_repository.update_invitation(&invitation).await?;

        info!("Cancelled invitation {}", invitation_id);
        Ok(true)
    }

    /// Pending, unexpired invitations addressed to the caller's email
    pub async fn list_pending_invitations(&self, caller: &CallerIdentity) -> DomainResult<Vec<FamilyInvitation>> {
        info!("Listing pending invitations for user: {}", caller.user_id);

        let email = match caller.email.as_deref() {
            Some(email) => email,
            None => {
                warn!("User {} has no email claim; no invitations can match", caller.user_id);
                return Ok(Vec::new());
            }
        };

        let invitations = self
            .invitation_repository
            .list_pending_for_email(email, Utc::now())
            .await?;

        info!("Found {} pending invitations", invitations.len());
        Ok(invitations)
    }

    pub async fn get_invitation_by_token(&self, token: &str) -> DomainResult<FamilyInvitation> {
        self.invitation_repository
            .get_invitation_by_token(token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found or expired"))
    }

    /// A family's outstanding invitations. Tokens grant membership, so only
    /// members who may invite can see them.
    pub async fn list_family_invitations(
        &self,
        caller: &CallerIdentity,
        family_id: &str,
    ) -> DomainResult<Vec<FamilyInvitation>> {
        info!("Listing invitations for family: {}", family_id);

        self.require_inviter(caller, family_id).await?;
        let invitations = self
            .invitation_repository
            .list_pending_for_family(family_id, Utc::now())
            .await?;

        Ok(invitations)
    }

    /// The family owner, or an active member whose role may invite
    async fn require_inviter(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<()> {
        let family = self
            .family_repository
            .get_family(family_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Family not found: {}", family_id)))?;
        if family.is_owned_by(&caller.user_id) {
            return Ok(());
        }

        let may_invite = self
            .member_repository
            .get_member_by_user(family_id, &caller.user_id)
            .await?
            .map(|member| member.is_active() && member.role.can_invite())
            .unwrap_or(false);
        if may_invite {
            Ok(())
        } else {
            warn!("User {} may not invite into family {}", caller.user_id, family_id);
            Err(DomainError::unauthorized("Only owners and parents can invite members"))
        }
    }
}
