use crate::domain::commands::invitations::InviteMemberCommand;
use crate::domain::models::{FamilyInvitation as DomainInvitation, InvitationStatus as DomainStatus};
use shared::{
    FamilyInvitation as SharedInvitation, InvitationStatus as SharedStatus, InviteMemberRequest,
};

use super::{format_optional_timestamp, format_timestamp, MemberMapper};

pub struct InvitationMapper;

impl InvitationMapper {
    pub fn to_dto(domain: DomainInvitation) -> SharedInvitation {
        SharedInvitation {
            role: MemberMapper::role_to_dto(domain.role),
            status: Self::status_to_dto(domain.status),
            expires_at: format_timestamp(&domain.expires_at),
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_optional_timestamp(&domain.updated_at),
            id: domain.id,
            family_id: domain.family_id,
            email: domain.email,
            invited_by: domain.invited_by,
            message: domain.message,
            token: domain.token,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainInvitation>) -> Vec<SharedInvitation> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_invite_command(family_id: String, request: InviteMemberRequest) -> InviteMemberCommand {
        InviteMemberCommand {
            family_id,
            email: request.email,
            role: request.role.map(MemberMapper::role_to_domain),
            message: request.message,
        }
    }

    fn status_to_dto(status: DomainStatus) -> SharedStatus {
        match status {
            DomainStatus::Pending => SharedStatus::Pending,
            DomainStatus::Accepted => SharedStatus::Accepted,
            DomainStatus::Declined => SharedStatus::Declined,
            DomainStatus::Expired => SharedStatus::Expired,
        }
    }
}
