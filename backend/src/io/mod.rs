//! # IO Module
//!
//! The interface layer between HTTP clients and the domain services.
//!
//! Two transports expose the same operations:
//!
//! - **REST** (`/api/...`): resource-oriented JSON endpoints
//! - **GraphQL** (`/graphql`): queries and mutations over the same DTOs
//!
//! Both resolve the caller from the bearer credential, translate DTOs into
//! domain commands through the mappers, and map domain errors onto one status
//! and code table.

pub mod graphql;
pub mod rest;
