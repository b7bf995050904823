use crate::domain::commands::families::{CreateFamilyCommand, UpdateFamilyCommand};
use crate::domain::models::{Family as DomainFamily, FamilyDetails as DomainFamilyDetails};
use shared::{
    CreateFamilyRequest, Family as SharedFamily, FamilyDetails as SharedFamilyDetails,
    UpdateFamilyRequest,
};

use super::{format_optional_timestamp, format_timestamp, BabyMapper, MemberMapper};

/// Mapper to convert between shared Family DTOs and domain Family models.
pub struct FamilyMapper;

impl FamilyMapper {
    pub fn to_dto(domain: DomainFamily) -> SharedFamily {
        SharedFamily {
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_optional_timestamp(&domain.updated_at),
            id: domain.id,
            name: domain.name,
            owner_id: domain.owner_id,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainFamily>) -> Vec<SharedFamily> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_details_dto(domain: DomainFamilyDetails) -> SharedFamilyDetails {
        SharedFamilyDetails {
            family: Self::to_dto(domain.family),
            members: MemberMapper::to_dto_list(domain.members),
            babies: BabyMapper::to_dto_list(domain.babies),
        }
    }

    pub fn to_create_command(request: CreateFamilyRequest) -> CreateFamilyCommand {
        CreateFamilyCommand {
            name: request.name,
            owner_display_name: request.owner_display_name,
        }
    }

    pub fn to_update_command(request: UpdateFamilyRequest) -> UpdateFamilyCommand {
        UpdateFamilyCommand { name: request.name }
    }
}
