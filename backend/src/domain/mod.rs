//! # Domain Module
//!
//! Business rules for family-shared baby tracking.
//!
//! Every operation takes the resolved [`CallerIdentity`] explicitly; no
//! service reads ambient request state. Authorization is decided against the
//! family graph (families, memberships, babies) through [`AccessPolicy`].
//!
//! ## Module Organization
//!
//! - **identity**: Resolving a caller from an upstream-validated bearer token
//! - **authorization**: Membership, ownership and creator-or-owner predicates
//! - **family_service**: Families, babies and membership management
//! - **invitation_service**: Invitation lifecycle (pending → accepted/declined/expired)
//! - **feed_entry_service** / **sleep_service**: The two entry stores
//! - **migration_service**: Adoption of entries recorded before families existed
//! - **commands**: Inputs consumed by the services
//! - **validation**: Field parsing shared by the services
//!
//! ## Business Rules
//!
//! - Only active members see a family's babies and entries
//! - Ownership lives on the family; the owner can be neither removed nor demoted
//! - Entries are modifiable by their creator or the family owner
//! - A baby has at most one active sleep session

pub mod authorization;
pub mod commands;
pub mod error;
pub mod family_service;
pub mod feed_entry_service;
pub mod identity;
pub mod invitation_service;
pub mod migration_service;
pub mod models;
pub mod sleep_service;
pub mod validation;

pub use authorization::AccessPolicy;
pub use error::{DomainError, DomainResult};
pub use family_service::FamilyService;
pub use feed_entry_service::FeedEntryService;
pub use identity::{CallerIdentity, IdentityResolver};
pub use invitation_service::InvitationService;
pub use migration_service::{MigrationReport, MigrationService};
pub use sleep_service::SleepService;
