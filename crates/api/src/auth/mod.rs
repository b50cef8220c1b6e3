//! Token authentication.
//!
//! Identity is provisioned elsewhere; this service only verifies the bearer
//! tokens it is handed. See [`jwt`].

pub mod jwt;
