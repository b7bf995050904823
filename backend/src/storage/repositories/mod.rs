pub mod baby_repository;
pub mod family_repository;
pub mod feed_entry_repository;
pub mod invitation_repository;
pub mod legacy_migration_repository;
pub mod member_repository;
pub mod sleep_session_repository;

pub use baby_repository::BabyRepository;
pub use family_repository::FamilyRepository;
pub use feed_entry_repository::FeedEntryRepository;
pub use invitation_repository::InvitationRepository;
pub use legacy_migration_repository::LegacyMigrationRepository;
pub use member_repository::MemberRepository;
pub use sleep_session_repository::SleepSessionRepository;
