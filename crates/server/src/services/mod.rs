//! Service layer: business logic above the repositories.

pub mod auth;
pub mod catalogue;
