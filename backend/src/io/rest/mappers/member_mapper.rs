use crate::domain::models::{
    FamilyMember as DomainMember, FamilyMemberRole as DomainRole,
    MembershipStatus as DomainStatus,
};
use shared::{
    FamilyMember as SharedMember, FamilyMemberRole as SharedRole, MembershipStatus as SharedStatus,
};

use super::{format_optional_timestamp, format_timestamp};

/// Mapper for membership rows and member roles.
pub struct MemberMapper;

impl MemberMapper {
    pub fn to_dto(domain: DomainMember) -> SharedMember {
        SharedMember {
            role: Self::role_to_dto(domain.role),
            status: Self::status_to_dto(domain.status),
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_optional_timestamp(&domain.updated_at),
            id: domain.id,
            family_id: domain.family_id,
            user_id: domain.user_id,
            display_name: domain.display_name,
            email: domain.email,
            invited_by: domain.invited_by,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainMember>) -> Vec<SharedMember> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn role_to_dto(role: DomainRole) -> SharedRole {
        match role {
            DomainRole::Owner => SharedRole::Owner,
            DomainRole::Parent => SharedRole::Parent,
            DomainRole::Caregiver => SharedRole::Caregiver,
        }
    }

    pub fn role_to_domain(role: SharedRole) -> DomainRole {
        match role {
            SharedRole::Owner => DomainRole::Owner,
            SharedRole::Parent => DomainRole::Parent,
            SharedRole::Caregiver => DomainRole::Caregiver,
        }
    }

    fn status_to_dto(status: DomainStatus) -> SharedStatus {
        match status {
            DomainStatus::Pending => SharedStatus::Pending,
            DomainStatus::Active => SharedStatus::Active,
            DomainStatus::Inactive => SharedStatus::Inactive,
        }
    }
}
