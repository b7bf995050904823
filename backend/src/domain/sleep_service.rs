//! Sleep sessions, scoped to a baby.
//!
//! A baby has at most one active session. Starting another while one is
//! running is a conflict; the running session must be stopped explicitly.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::authorization::AccessPolicy;
use crate::domain::commands::entries::{EntryListQuery, EntryScope};
use crate::domain::commands::sleep_sessions::{
    CreateSleepSessionCommand, StopSleepCommand, UpdateSleepSessionCommand,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::identity::CallerIdentity;
use crate::domain::models::SleepSession;
use crate::domain::validation::{
    optional_text, parse_date, parse_time, validate_duration, MAX_TEXT_LENGTH,
};
use crate::storage::traits::SleepSessionStorage;
use crate::storage::{DbConnection, SleepSessionRepository};

/// Service for the sleep session store
#[derive(Clone)]
pub struct SleepService {
    access: AccessPolicy,
    sleep_session_repository: SleepSessionRepository,
}

impl SleepService {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self {
            access: AccessPolicy::new(db.clone()),
            sleep_session_repository: SleepSessionRepository::new((*db).clone()),
        }
    }

    pub async fn create_sleep_session(
        &self,
        caller: &CallerIdentity,
        command: CreateSleepSessionCommand,
    ) -> DomainResult<SleepSession> {
        info!(
            "Creating sleep session: baby={}, date={}, start={}, active={}",
            command.baby_id, command.date, command.start_time, command.is_active
        );

        self.access.require_baby_access(caller, &command.baby_id).await?;

        let end_time = command
            .end_time
            .as_deref()
            .map(|end| parse_time("End time", end))
            .transpose()?;
        if command.is_active && end_time.is_some() {
            return Err(DomainError::validation("An active sleep session cannot have an end time"));
        }

        let session = SleepSession {
            id: SleepSession::generate_id(),
            baby_id: Some(command.baby_id.clone()),
            user_id: caller.user_id.clone(),
            date: parse_date("Date", &command.date)?,
            start_time: parse_time("Start time", &command.start_time)?,
            end_time,
            duration_minutes: validate_duration(command.duration_minutes)?,
            is_active: command.is_active,
            comment: optional_text("Comment", command.comment.as_deref(), MAX_TEXT_LENGTH)?,
            created_at: Utc::now(),
            updated_at: None,
        };

        if session.is_active {
            self.ensure_no_other_active(&command.baby_id, &session.id).await?;
        }

        self.sleep_session_repository.store_sleep_session(&session).await?;

        info!("Created sleep session: {}", session.id);
        Ok(session)
    }

    pub async fn get_sleep_session(&self, caller: &CallerIdentity, session_id: &str) -> DomainResult<SleepSession> {
        info!("Getting sleep session: {}", session_id);

        let session = self.load(session_id).await?;
        self.access
            .require_entry_visible(caller, session.baby_id.as_deref(), &session.user_id)
            .await?;

        Ok(session)
    }

    /// The baby's running session, if any
    pub async fn active_session(&self, caller: &CallerIdentity, baby_id: &str) -> DomainResult<Option<SleepSession>> {
        self.access.require_baby_access(caller, baby_id).await?;
        Ok(self.sleep_session_repository.get_active_session(baby_id).await?)
    }

    /// Newest first
    pub async fn list_for_baby(&self, caller: &CallerIdentity, baby_id: &str) -> DomainResult<Vec<SleepSession>> {
        self.access.require_baby_access(caller, baby_id).await?;
        Ok(self.sleep_session_repository.list_sleep_sessions_for_baby(baby_id).await?)
    }

    pub async fn list_for_baby_on_date(
        &self,
        caller: &CallerIdentity,
        baby_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<SleepSession>> {
        self.list_for_baby_in_range(caller, baby_id, date, date).await
    }

    /// Chronological, inclusive on both bounds
    pub async fn list_for_baby_in_range(
        &self,
        caller: &CallerIdentity,
        baby_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DomainResult<Vec<SleepSession>> {
        self.access.require_baby_access(caller, baby_id).await?;
        Ok(self
            .sleep_session_repository
            .list_sleep_sessions_in_range(baby_id, start_date, end_date)
            .await?)
    }

    pub async fn list_for_family(&self, caller: &CallerIdentity, family_id: &str) -> DomainResult<Vec<SleepSession>> {
        self.access.require_family_member(caller, family_id).await?;
        Ok(self.sleep_session_repository.list_sleep_sessions_for_family(family_id).await?)
    }

    pub async fn list_for_caller(&self, caller: &CallerIdentity) -> DomainResult<Vec<SleepSession>> {
        Ok(self.sleep_session_repository.list_sleep_sessions_for_user(&caller.user_id).await?)
    }

    pub async fn list_sleep_sessions(
        &self,
        caller: &CallerIdentity,
        query: EntryListQuery,
    ) -> DomainResult<Vec<SleepSession>> {
        info!("Listing sleep sessions: {:?}", query);

        let sessions = match query.scope()? {
            EntryScope::Baby(baby_id) => self.list_for_baby(caller, &baby_id).await?,
            EntryScope::BabyRange {
                baby_id,
                start_date,
                end_date,
            } => {
                self.list_for_baby_in_range(caller, &baby_id, start_date, end_date)
                    .await?
            }
            EntryScope::Family(family_id) => self.list_for_family(caller, &family_id).await?,
            EntryScope::Caller => self.list_for_caller(caller).await?,
        };

        info!("Found {} sleep sessions", sessions.len());
        Ok(sessions)
    }

    /// Creator-or-owner. Activating a session, or moving an active one, is
    /// subject to the one-active-session rule of the target baby.
    pub async fn update_sleep_session(
        &self,
        caller: &CallerIdentity,
        session_id: &str,
        command: UpdateSleepSessionCommand,
    ) -> DomainResult<SleepSession> {
        info!("Updating sleep session: {}", session_id);

        let mut session = self.load(session_id).await?;
        self.access
            .require_entry_modifiable(caller, session.baby_id.as_deref(), &session.user_id)
            .await?;

        if let Some(baby_id) = command.baby_id {
            if session.baby_id.as_deref() != Some(baby_id.as_str()) {
                self.access.require_baby_access(caller, &baby_id).await?;
                session.baby_id = Some(baby_id);
            }
        }
        if let Some(date) = command.date {
            session.date = parse_date("Date", &date)?;
        }
        if let Some(start_time) = command.start_time {
            session.start_time = parse_time("Start time", &start_time)?;
        }
        if let Some(end_time) = command.end_time {
            session.end_time = Some(parse_time("End time", &end_time)?);
        }
        if let Some(duration) = command.duration_minutes {
            session.duration_minutes = validate_duration(Some(duration))?;
        }
        if let Some(is_active) = command.is_active {
            session.is_active = is_active;
        }
        if let Some(comment) = command.comment {
            session.comment = optional_text("Comment", Some(&comment), MAX_TEXT_LENGTH)?;
        }

        if session.is_active {
            if session.end_time.is_some() {
                return Err(DomainError::validation("An active sleep session cannot have an end time"));
            }
            if let Some(baby_id) = session.baby_id.as_deref() {
                self.ensure_no_other_active(baby_id, &session.id).await?;
            }
        }
        session.updated_at = Some(Utc::now());

        self.sleep_session_repository.update_sleep_session(&session).await?;

        info!("Updated sleep session: {}", session.id);
        Ok(session)
    }

    /// Any member with access to the baby may end the running session.
    /// The duration is the client's computation and is stored as given.
    pub async fn stop_sleep(
        &self,
        caller: &CallerIdentity,
        session_id: &str,
        command: StopSleepCommand,
    ) -> DomainResult<SleepSession> {
        info!(
            "Stopping sleep session {}: end={}, duration={}",
            session_id, command.end_time, command.duration_minutes
        );

        let mut session = self.load(session_id).await?;
        self.access
            .require_entry_visible(caller, session.baby_id.as_deref(), &session.user_id)
            .await?;

        if !session.is_active {
            warn!("Sleep session {} is not active", session_id);
            return Err(DomainError::conflict("Sleep session is not active"));
        }

        let end_time = parse_time("End time", &command.end_time)?;
        let duration = validate_duration(Some(command.duration_minutes))?.unwrap_or_default();
        session.stop(end_time, duration, Utc::now());

        self.sleep_session_repository.update_sleep_session(&session).await?;

        info!("Stopped sleep session {} after {} minutes", session.id, duration);
        Ok(session)
    }

    /// Returns false when the session does not exist
    pub async fn delete_sleep_session(&self, caller: &CallerIdentity, session_id: &str) -> DomainResult<bool> {
        info!("Deleting sleep session: {}", session_id);

        let session = match self.sleep_session_repository.get_sleep_session(session_id).await? {
            Some(session) => session,
            None => {
                warn!("Sleep session not found: {}", session_id);
                return Ok(false);
            }
        };
        self.access
            .require_entry_modifiable(caller, session.baby_id.as_deref(), &session.user_id)
            .await?;

        Ok(self.sleep_session_repository.delete_sleep_session(session_id).await?)
    }

    async fn ensure_no_other_active(&self, baby_id: &str, session_id: &str) -> DomainResult<()> {
        match self.sleep_session_repository.get_active_session(baby_id).await? {
            Some(active) if active.id != session_id => {
                warn!("Baby {} already has active sleep session {}", baby_id, active.id);
                Err(DomainError::conflict(
                    "There is already an active sleep session for this baby. Please end it first.",
                ))
            }
            _ => Ok(()),
        }
    }

    async fn load(&self, session_id: &str) -> DomainResult<SleepSession> {
        self.sleep_session_repository
            .get_sleep_session(session_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Sleep session not found: {}", session_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::babies::CreateBabyCommand;
    use crate::domain::commands::families::CreateFamilyCommand;
    use crate::domain::family_service::FamilyService;
    use crate::domain::models::Baby;

    fn owner() -> CallerIdentity {
        CallerIdentity::new("owner")
    }

    async fn setup_test() -> (SleepService, FamilyService, Baby) {
        let db = Arc::new(DbConnection::init_test().await.expect("Failed to create test database"));
        let families = FamilyService::new(db.clone());
        let family = families
            .create_family(
                &owner(),
                CreateFamilyCommand {
                    name: "Home".to_string(),
                    owner_display_name: None,
                },
            )
            .await
            .unwrap();
        let baby = families
            .create_baby(
                &owner(),
                CreateBabyCommand {
                    family_id: family.id,
                    name: "Lily".to_string(),
                    birth_date: None,
                    gender: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        (SleepService::new(db), families, baby)
    }

    fn start_sleep(baby_id: &str, start_time: &str) -> CreateSleepSessionCommand {
        CreateSleepSessionCommand {
            baby_id: baby_id.to_string(),
            date: "2024-03-01".to_string(),
            start_time: start_time.to_string(),
            end_time: None,
            duration_minutes: None,
            is_active: true,
            comment: None,
        }
    }

    fn stop(end_time: &str, duration_minutes: i32) -> StopSleepCommand {
        StopSleepCommand {
            end_time: end_time.to_string(),
            duration_minutes,
        }
    }

    #[tokio::test]
    async fn test_second_active_session_conflicts() {
        let (service, _, baby) = setup_test().await;

        let first = service.create_sleep_session(&owner(), start_sleep(&baby.id, "20:00")).await.unwrap();
        assert!(first.is_active);

        let err = service
            .create_sleep_session(&owner(), start_sleep(&baby.id, "21:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let active = service.active_session(&owner(), &baby.id).await.unwrap();
        assert_eq!(active.map(|s| s.id), Some(first.id));
    }

    #[tokio::test]
    async fn test_stop_sleep_once() {
        let (service, _, baby) = setup_test().await;
        let session = service.create_sleep_session(&owner(), start_sleep(&baby.id, "22:30")).await.unwrap();

        let stopped = service.stop_sleep(&owner(), &session.id, stop("06:15", 465)).await.unwrap();
        assert!(!stopped.is_active);
        assert_eq!(stopped.duration_minutes, Some(465));
        assert_eq!(stopped.end_time.map(|t| t.format("%H:%M").to_string()), Some("06:15".to_string()));
        assert!(service.active_session(&owner(), &baby.id).await.unwrap().is_none());

        let err = service.stop_sleep(&owner(), &session.id, stop("06:20", 470)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        service
            .create_sleep_session(&owner(), start_sleep(&baby.id, "13:00"))
            .await
            .expect("A new session may start once the previous one stopped");
    }

    #[tokio::test]
    async fn test_completed_sessions_do_not_conflict() {
        let (service, _, baby) = setup_test().await;
        service.create_sleep_session(&owner(), start_sleep(&baby.id, "20:00")).await.unwrap();

        let mut nap = start_sleep(&baby.id, "13:00");
        nap.is_active = false;
        nap.end_time = Some("14:10".to_string());
        nap.duration_minutes = Some(70);

        let stored = service.create_sleep_session(&owner(), nap).await.unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_active_session_with_end_time_rejected() {
        let (service, _, baby) = setup_test().await;
        let mut command = start_sleep(&baby.id, "20:00");
        command.end_time = Some("21:00".to_string());

        let err = service.create_sleep_session(&owner(), command).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reactivating_session_respects_single_active() {
        let (service, _, baby) = setup_test().await;
        let mut nap = start_sleep(&baby.id, "13:00");
        nap.is_active = false;
        let nap = service.create_sleep_session(&owner(), nap).await.unwrap();
        service.create_sleep_session(&owner(), start_sleep(&baby.id, "20:00")).await.unwrap();

        let err = service
            .update_sleep_session(
                &owner(),
                &nap.id,
                UpdateSleepSessionCommand {
                    is_active: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_other_member_cannot_edit_but_owner_can() {
        let (service, families, baby) = setup_test().await;
        let session = service.create_sleep_session(&owner(), start_sleep(&baby.id, "20:00")).await.unwrap();
        let outsider = CallerIdentity::new("outsider");
        families
            .create_family(
                &outsider,
                CreateFamilyCommand {
                    name: "Other".to_string(),
                    owner_display_name: None,
                },
            )
            .await
            .unwrap();

        let err = service
            .update_sleep_session(&outsider, &session.id, UpdateSleepSessionCommand::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
        let err = service.stop_sleep(&outsider, &session.id, stop("06:00", 600)).await.unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));

        let updated = service
            .update_sleep_session(
                &owner(),
                &session.id,
                UpdateSleepSessionCommand {
                    comment: Some("Restless".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.comment.as_deref(), Some("Restless"));
        assert!(updated.is_active);

        assert!(service.delete_sleep_session(&owner(), &session.id).await.unwrap());
        assert!(!service.delete_sleep_session(&owner(), &session.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_duration_rejected() {
        let (service, _, baby) = setup_test().await;
        let session = service.create_sleep_session(&owner(), start_sleep(&baby.id, "20:00")).await.unwrap();

        let err = service.stop_sleep(&owner(), &session.id, stop("21:00", -5)).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }
}
