//! HTTP middleware for shared-secret authentication.
pub mod auth;
