//! Request extractors for authentication and role checks.
//!
//! - [`auth::AuthUser`] -- the caller identified by a Bearer token.
//! - [`rbac::RequireAdmin`] -- rejects non-admins with 403.
//! - [`rbac::RequireAuth`] -- any authenticated caller.

pub mod auth;
pub mod rbac;
