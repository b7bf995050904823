use crate::domain::commands::babies::{CreateBabyCommand, UpdateBabyCommand};
use crate::domain::models::{Baby as DomainBaby, Gender as DomainGender};
use crate::domain::validation::format_date;
use shared::{Baby as SharedBaby, CreateBabyRequest, Gender as SharedGender, UpdateBabyRequest};

use super::{format_optional_timestamp, format_timestamp};

/// Mapper to convert between shared Baby DTOs and domain Baby models.
pub struct BabyMapper;

impl BabyMapper {
    pub fn to_dto(domain: DomainBaby) -> SharedBaby {
        SharedBaby {
            birth_date: domain.birth_date.as_ref().map(format_date),
            gender: Self::gender_to_dto(domain.gender),
            created_at: format_timestamp(&domain.created_at),
            updated_at: format_optional_timestamp(&domain.updated_at),
            id: domain.id,
            family_id: domain.family_id,
            name: domain.name,
            notes: domain.notes,
            created_by: domain.created_by,
        }
    }

    pub fn to_dto_list(domain: Vec<DomainBaby>) -> Vec<SharedBaby> {
        domain.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(family_id: String, request: CreateBabyRequest) -> CreateBabyCommand {
        CreateBabyCommand {
            family_id,
            name: request.name,
            birth_date: request.birth_date,
            gender: request.gender.map(Self::gender_to_domain),
            notes: request.notes,
        }
    }

    pub fn to_update_command(request: UpdateBabyRequest) -> UpdateBabyCommand {
        UpdateBabyCommand {
            name: request.name,
            birth_date: request.birth_date,
            gender: request.gender.map(Self::gender_to_domain),
            notes: request.notes,
        }
    }

    fn gender_to_dto(gender: DomainGender) -> SharedGender {
        match gender {
            DomainGender::Unknown => SharedGender::Unknown,
            DomainGender::Male => SharedGender::Male,
            DomainGender::Female => SharedGender::Female,
        }
    }

    fn gender_to_domain(gender: SharedGender) -> DomainGender {
        match gender {
            SharedGender::Unknown => DomainGender::Unknown,
            SharedGender::Male => DomainGender::Male,
            SharedGender::Female => DomainGender::Female,
        }
    }
}
