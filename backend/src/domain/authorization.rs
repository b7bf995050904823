//! Family-scoped authorization predicates.
//!
//! The predicates are pure reads against current store state. The `require_*`
//! helpers turn a failed predicate into [`DomainError::Unauthorized`] at the
//! point of violation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::CallerIdentity;
use crate::domain::models::{Baby, Family};
use crate::storage::traits::{BabyStorage, FamilyStorage, MemberStorage};
use crate::storage::{BabyRepository, DbConnection, FamilyRepository, MemberRepository};

#[derive(Clone)]
pub struct AccessPolicy {
    family_repository: FamilyRepository,
    member_repository: MemberRepository,
    baby_repository: BabyRepository,
}

impl AccessPolicy {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self {
            family_repository: FamilyRepository::new((*db).clone()),
            member_repository: MemberRepository::new((*db).clone()),
            baby_repository: BabyRepository::new((*db).clone()),
        }
    }

    /// True iff an Active membership row exists for (user, family)
    pub async fn is_family_member(&self, user_id: &str, family_id: &str) -> DomainResult<bool> {
        let is_member = self.member_repository.is_active_member(family_id, user_id).await?;
        debug!("is_family_member: user={}, family={}, result={}", user_id, family_id, is_member);
        Ok(is_member)
    }

    /// Ownership lives on the family row, independent of membership rows
    pub async fn is_family_owner(&self, user_id: &str, family_id: &str) -> DomainResult<bool> {
        let is_owner = self
            .family_repository
            .get_family(family_id)
            .await?
            .map(|family| family.is_owned_by(user_id))
            .unwrap_or(false);
        debug!("is_family_owner: user={}, family={}, result={}", user_id, family_id, is_owner);
        Ok(is_owner)
    }

    /// Membership in the baby's family; false when the baby does not exist
    pub async fn can_access_baby(&self, user_id: &str, baby_id: &str) -> DomainResult<bool> {
        match self.baby_repository.get_baby(baby_id).await? {
            Some(baby) => self.is_family_member(user_id, &baby.family_id).await,
            None => {
                debug!("can_access_baby: baby {} does not exist", baby_id);
                Ok(false)
            }
        }
    }

    /// Entries may be changed by their creator or by the family owner
    pub async fn can_modify_entry(&self, user_id: &str, creator_id: &str, family_id: &str) -> DomainResult<bool> {
        if user_id == creator_id {
            return Ok(true);
        }
        self.is_family_owner(user_id, family_id).await
    }

    pub async fn require_family_member(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<()> {
        if self.is_family_member(&caller.user_id, family_id).await? {
            Ok(())
        } else {
            warn!("User {} is not a member of family {}", caller.user_id, family_id);
            Err(DomainError::unauthorized("Not a member of this family"))
        }
    }

    /// Loads the family and checks the caller owns it
    pub async fn require_family_owner(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<Family> {
        let family = self
            .family_repository
            .get_family(family_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Family not found: {}", family_id)))?;

        if !family.is_owned_by(&caller.user_id) {
            warn!("User {} is not the owner of family {}", caller.user_id, family_id);
            return Err(DomainError::unauthorized("Only the family owner can do this"));
        }
        Ok(family)
    }

    /// Loads the baby and checks the caller belongs to its family. A missing
    /// baby is reported the same way as a foreign one.
    pub async fn require_baby_access(&self, caller: &CallerIdentity, baby_id: &str) -> DomainResult<Baby> {
        if let Some(baby) = self.baby_repository.get_baby(baby_id).await? {
            if self.is_family_member(&caller.user_id, &baby.family_id).await? {
                return Ok(baby);
            }
        }
        warn!("User {} cannot access baby {}", caller.user_id, baby_id);
        Err(DomainError::unauthorized("No access to this baby"))
    }

    /// Visibility of an entry. Entries without a baby predate families and
    /// are visible to their creator only.
    pub async fn require_entry_visible(
        &self,
        caller: &CallerIdentity,
        baby_id: Option<&str>,
        creator_id: &str,
    ) -> DomainResult<()> {
        match baby_id {
            Some(baby_id) => self.require_baby_access(caller, baby_id).await.map(|_| ()),
            None if caller.user_id == creator_id => Ok(()),
            None => Err(DomainError::unauthorized("No access to this entry")),
        }
    }

    /// Access to the entry's current baby plus the creator-or-owner rule
    pub async fn require_entry_modifiable(
        &self,
        caller: &CallerIdentity,
        baby_id: Option<&str>,
        creator_id: &str,
    ) -> DomainResult<()> {
        let allowed = match baby_id {
            Some(baby_id) => {
                let baby = self.require_baby_access(caller, baby_id).await?;
                self.can_modify_entry(&caller.user_id, creator_id, &baby.family_id).await?
            }
            None => caller.user_id == creator_id,
        };

        if allowed {
            Ok(())
        } else {
            warn!("User {} may not modify an entry created by {}", caller.user_id, creator_id);
            Err(DomainError::unauthorized(
                "Only the creator or the family owner can change this entry",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::babies::CreateBabyCommand;
    use crate::domain::commands::families::CreateFamilyCommand;
    use crate::domain::family_service::FamilyService;

    async fn setup_test() -> (AccessPolicy, FamilyService) {
        let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
        (AccessPolicy::new(db.clone()), FamilyService::new(db))
    }

    fn create_family(name: &str) -> CreateFamilyCommand {
        CreateFamilyCommand {
            name: name.to_string(),
            owner_display_name: None,
        }
    }

    #[tokio::test]
    async fn test_creator_is_owner_and_member() {
        let (policy, families) = setup_test().await;
        let alice = CallerIdentity::new("user-a");

        let family = families.create_family(&alice, create_family("Home")).await.unwrap();

        assert!(policy.is_family_owner("user-a", &family.id).await.unwrap());
        assert!(policy.is_family_member("user-a", &family.id).await.unwrap());
        assert!(!policy.is_family_member("user-b", &family.id).await.unwrap());
        assert!(!policy.is_family_owner("user-a", "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_baby_access_follows_family_membership() {
        let (policy, families) = setup_test().await;
        let alice = CallerIdentity::new("user-a");
        let bob = CallerIdentity::new("user-b");
        let family = families.create_family(&alice, create_family("Home")).await.unwrap();
        let baby = families
            .create_baby(
                &alice,
                CreateBabyCommand {
                    family_id: family.id.clone(),
                    name: "Lily".to_string(),
                    birth_date: None,
                    gender: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert!(policy.can_access_baby("user-a", &baby.id).await.unwrap());
        assert!(!policy.can_access_baby("user-b", &baby.id).await.unwrap());
        assert!(!policy.can_access_baby("user-a", "no-such-baby").await.unwrap());

        let err = policy.require_baby_access(&bob, &baby.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_creator_or_owner_may_modify() {
        let (policy, families) = setup_test().await;
        let alice = CallerIdentity::new("user-a");
        let family = families.create_family(&alice, create_family("Home")).await.unwrap();

        assert!(policy.can_modify_entry("user-b", "user-b", &family.id).await.unwrap());
        assert!(policy.can_modify_entry("user-a", "user-b", &family.id).await.unwrap());
        assert!(!policy.can_modify_entry("user-c", "user-b", &family.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_without_baby_belong_to_creator() {
        let (policy, _) = setup_test().await;
        let alice = CallerIdentity::new("user-a");

        policy.require_entry_modifiable(&alice, None, "user-a").await.unwrap();
        let err = policy.require_entry_visible(&alice, None, "user-b").await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
