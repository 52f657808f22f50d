//! Access Domain - Roles, Permission Matrix and User Management
//!
//! This crate owns the authorization decision for the whole back office:
//!
//! - [`Role`] and [`Capability`] are closed tagged-variant types; there is
//!   no string comparison anywhere in the rule table.
//! - [`matrix::authorize`] is a single exhaustive match implementing the
//!   fixed-precedence rules (administrator > manager > sales > reception
//!   baseline + grants, with self-service password change on top).
//! - [`AccessService`] applies authorize → validate → execute ordering to
//!   user management, authentication and the admin-only activity-log reads,
//!   appending one audit entry per successful mutation.

pub mod error;
pub mod matrix;
pub mod ports;
pub mod role;
pub mod service;
pub mod user;

pub use error::AccessError;
pub use matrix::{authorize, AccessDenied, Action, Actor, DenyReason};
pub use ports::{PasswordHasher, UserStore};
pub use role::{Capability, PermissionGrants, Role};
pub use service::{AccessService, NewUser, UserUpdate};
pub use user::{User, BOOTSTRAP_ADMIN_USERNAME};
