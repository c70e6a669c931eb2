//! Core types for AWE Electronics.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{AccountStatus, Role, RoleParseError, StatusParseError};
