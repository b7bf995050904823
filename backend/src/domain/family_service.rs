//! Families, their babies and their membership roster.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::authorization::AccessPolicy;
use crate::domain::commands::babies::{CreateBabyCommand, UpdateBabyCommand};
use crate::domain::commands::families::{CreateFamilyCommand, UpdateFamilyCommand};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::CallerIdentity;
use crate::domain::models::{
    Baby, Family, FamilyDetails, FamilyMember, FamilyMemberRole, Gender, MembershipStatus,
};
use crate::domain::validation::{
    optional_text, parse_optional_date, require_text, MAX_NAME_LENGTH, MAX_TEXT_LENGTH,
};
use crate::storage::traits::{BabyStorage, FamilyStorage, MemberStorage};
use crate::storage::{BabyRepository, DbConnection, FamilyRepository, MemberRepository};

/// Service for managing families, babies and members
#[derive(Clone)]
pub struct FamilyService {
    access: AccessPolicy,
    family_repository: FamilyRepository,
    member_repository: MemberRepository,
    baby_repository: BabyRepository,
}

impl FamilyService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self {
            access: AccessPolicy::new(db.clone()),
            family_repository: FamilyRepository::new((*db).clone()),
            member_repository: MemberRepository::new((*db).clone()),
            baby_repository: BabyRepository::new((*db).clone()),
        }
    }

    /// Create a family owned by the caller, with the caller as its active Owner member
    pub async fn create_family(&self, caller: &CallerIdentity, command: CreateFamilyCommand) -> DomainResult<Family> {
        info!("Creating family: name={}, owner={}", command.name, caller.user_id);

        let name = require_text("Family name", &command.name, MAX_NAME_LENGTH)?;
        let display_name = optional_text(
            "Display name",
            command.owner_display_name.as_deref(),
            MAX_NAME_LENGTH,
        )?
        .unwrap_or_else(|| caller.display_name_or(FamilyMember::OWNER_DISPLAY_NAME));

        let now = Utc::now();
        let family = Family {
            id: Family::generate_id(),
            name,
            owner_id: caller.user_id.clone(),
            created_at: now,
            updated_at: None,
        };
        let owner = FamilyMember {
            id: FamilyMember::generate_id(),
            family_id: family.id.clone(),
            user_id: caller.user_id.clone(),
            display_name,
            email: caller.email.clone(),
            role: FamilyMemberRole::Owner,
            status: MembershipStatus::Active,
            invited_by: None,
            created_at: now,
            updated_at: None,
        };

        self.family_repository.create_family_with_owner(&family, &owner).await?;

        info!("Created family: {} with ID: {}", family.name, family.id);
        Ok(family)
    }

    /// Families the caller owns or actively belongs to
    pub async fn list_user_families(&self, caller: &CallerIdentity) -> DomainResult<Vec<Family>> {
        info!("Listing families for user: {}", caller.user_id);

        let families = self.family_repository.list_families_for_user(&caller.user_id).await?;

        info!("Found {} families", families.len());
        Ok(families)
    }

    pub async fn get_family(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<Family> {
        info!("Getting family: {}", family_id);

        let family = self
            .family_repository
            .get_family(family_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Family not found: {}", family_id)))?;
        self.access.require_family_member(caller, family_id).await?;

        Ok(family)
    }

    /// Family with its active members and babies
    pub async fn get_family_details(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<FamilyDetails> {
        let family = self.get_family(caller, family_id).await?;
        let members = self.member_repository.list_active_members(family_id).await?;
        let babies = self.baby_repository.list_babies(family_id).await?;

        Ok(FamilyDetails {
            family,
            members,
            babies,
        })
    }

    /// Owner-only partial update
    pub async fn update_family(
        &self,
        caller: &CallerIdentity,
        family_id: &str,
        command: UpdateFamilyCommand,
    ) -> DomainResult<Family> {
        info!("Updating family: {}", family_id);

        let mut family = self.access.require_family_owner(caller, family_id).await?;

        if let Some(name) = command.name {
            family.name = require_text("Family name", &name, MAX_NAME_LENGTH)?;
        }
        family.updated_at = Some(Utc::now());

        self.family_repository.update_family(&family).await?;

        info!("Updated family: {} with ID: {}", family.name, family.id);
        Ok(family)
    }

    /// Owner-only; cascades to members, babies, invitations and entries.
    /// Returns false when the family does not exist.
    pub async fn delete_family(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<bool> {
        info!("Deleting family: {}", family_id);

        if self.family_repository.get_family(family_id).await?.is_none() {
            warn!("Family not found: {}", family_id);
            return Ok(false);
        }
        self.access.require_family_owner(caller, family_id).await?;

        let deleted = self.family_repository.delete_family(family_id).await?;

        info!("Deleted family {}: {}", family_id, deleted);
        Ok(deleted)
    }

    /// Any active member may add a baby
    pub async fn create_baby(&self, caller: &CallerIdentity, command: CreateBabyCommand) -> DomainResult<Baby> {
        info!("Creating baby: name={}, family={}", command.name, command.family_id);

        self.access.require_family_member(caller, &command.family_id).await?;

        let now = Utc::now();
        let baby = Baby {
            id: Baby::generate_id(),
            family_id: command.family_id,
            name: require_text("Baby name", &command.name, MAX_NAME_LENGTH)?,
            birth_date: parse_optional_date("Birth date", command.birth_date.as_deref())?,
            gender: command.gender.unwrap_or(Gender::Unknown),
            notes: optional_text("Notes", command.notes.as_deref(), MAX_TEXT_LENGTH)?,
            created_by: caller.user_id.clone(),
            created_at: now,
            updated_at: None,
        };

        self.baby_repository.store_baby(&baby).await?;

        info!("Created baby: {} with ID: {}", baby.name, baby.id);
        Ok(baby)
    }

    pub async fn get_baby(&self, caller: &CallerIdentity, baby_id: &str) -> DomainResult<Baby> {
        info!("Getting baby: {}", baby_id);

        let baby = self
            .baby_repository
            .get_baby(baby_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Baby not found: {}", baby_id)))?;
        self.access.require_family_member(caller, &baby.family_id).await?;

        Ok(baby)
    }

    pub async fn list_family_babies(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<Vec<Baby>> {
        info!("Listing babies for family: {}", family_id);

        self.access.require_family_member(caller, family_id).await?;
        let babies = self.baby_repository.list_babies(family_id).await?;

        info!("Found {} babies", babies.len());
        Ok(babies)
    }

    /// Any active member may edit the shared baby profile
    pub async fn update_baby(
        &self,
        caller: &CallerIdentity,
        baby_id: &str,
        command: UpdateBabyCommand,
    ) -> DomainResult<Baby> {
        info!("Updating baby: {}", baby_id);

        let mut baby = self.get_baby(caller, baby_id).await?;

        if let Some(name) = command.name {
            baby.name = require_text("Baby name", &name, MAX_NAME_LENGTH)?;
        }
        if let Some(birth_date) = command.birth_date {
            baby.birth_date = parse_optional_date("Birth date", Some(&birth_date))?;
        }
        if let Some(gender) = command.gender {
            baby.gender = gender;
        }
        if let Some(notes) = command.notes {
            baby.notes = optional_text("Notes", Some(&notes), MAX_TEXT_LENGTH)?;
        }
        baby.updated_at = Some(Utc::now());

        self.baby_repository.update_baby(&baby).await?;

        info!("Updated baby: {} with ID: {}", baby.name, baby.id);
        Ok(baby)
    }

    /// Owner-only. Returns false when the baby does not exist.
    pub async fn delete_baby(&self, caller: &CallerIdentity, baby_id: &str) -> DomainResult<bool> {
        info!("Deleting baby: {}", baby_id);

        let baby = match self.baby_repository.get_baby(baby_id).await? {
            Some(baby) => baby,
            None => {
                warn!("Baby not found: {}", baby_id);
                return Ok(false);
            }
        };
        self.access.require_family_owner(caller, &baby.family_id).await?;

        let deleted = self.baby_repository.delete_baby(baby_id).await?;

        info!("Deleted baby {}: {}", baby_id, deleted);
        Ok(deleted)
    }

    /// Active members ordered by role then display name
    pub async fn list_family_members(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<Vec<FamilyMember>> {
        info!("Listing members for family: {}", family_id);

        self.access.require_family_member(caller, family_id).await?;
        let members = self.member_repository.list_active_members(family_id).await?;

        info!("Found {} members", members.len());
        Ok(members)
    }

    /// Owner-only soft delete. Returns false when there is no active member
    /// with that id in the family.
    pub async fn remove_member(&self, caller: &CallerIdentity, family_id: &str, member_id: &str) -> DomainResult<bool> {
        info!("Removing member {} from family {}", member_id, family_id);

        let family = self.access.require_family_owner(caller, family_id).await?;

        let mut member = match self.member_repository.get_member(member_id).await? {
            Some(member) if member.family_id == family_id && member.is_active() => member,
            _ => {
                warn!("Active member {} not found in family {}", member_id, family_id);
                return Ok(false);
            }
        };
        Self::ensure_not_owner(&family, &member)?;

        member.status = MembershipStatus::Inactive;
        member.updated_at = Some(Utc::now());
        self.member_repository.update_member(&member).await?;

        info!("Removed member {} ({}) from family {}", member.id, member.user_id, family_id);
        Ok(true)
    }

    /// Owner-only. The Owner role can be neither granted nor taken away here.
    pub async fn update_member_role(
        &self,
        caller: &CallerIdentity,
        family_id: &str,
        member_id: &str,
        role: FamilyMemberRole,
    ) -> DomainResult<FamilyMember> {
        info!("Updating role of member {} in family {} to {}", member_id, family_id, role);

        let family = self.access.require_family_owner(caller, family_id).await?;

        let mut member = self
            .member_repository
            .get_member(member_id)
            .await?
            .filter(|member| member.family_id == family_id && member.is_active())
            .ok_or_else(|| DomainError::not_found(format!("Member not found: {}", member_id)))?;
        Self::ensure_not_owner(&family, &member)?;

        if role == FamilyMemberRole::Owner {
            return Err(DomainError::validation("The Owner role cannot be granted"));
        }

        member.role = role;
        member.updated_at = Some(Utc::now());
        self.member_repository.update_member(&member).await?;

        info!("Member {} is now {}", member.id, member.role);
        Ok(member)
    }

    /// Replace the caller's own display name in a family
    pub async fn update_my_display_name(
        &self,
        caller: &CallerIdentity,
        family_id: &str,
        display_name: &str,
    ) -> DomainResult<FamilyMember> {
        info!("Updating display name of {} in family {}", caller.user_id, family_id);

        let mut member = self
            .member_repository
            .get_member_by_user(family_id, &caller.user_id)
            .await?
            .filter(FamilyMember::is_active)
            .ok_or_else(|| DomainError::unauthorized("Not a member of this family"))?;

        member.display_name = require_text("Display name", display_name, MAX_NAME_LENGTH)?;
        member.updated_at = Some(Utc::now());
        self.member_repository.update_member(&member).await?;

        Ok(member)
    }

    fn ensure_not_owner(family: &Family, member: &FamilyMember) -> DomainResult<()> {
        if member.role == FamilyMemberRole::Owner || family.is_owned_by(&member.user_id) {
            warn!("Refusing to change the owner of family {}", family.id);
            return Err(DomainError::validation("The family owner cannot be changed or removed"));
        }
        Ok(())
    }
}
