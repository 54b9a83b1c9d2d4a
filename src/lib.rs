//! Auth-and-registration HTTP service over a managed identity/document
//! platform. Every substantive operation (password storage, identity
//! records, token verification, persistence) is delegated to the platform;
//! this crate is the request-to-platform translation layer.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod fields;
pub mod platform;
pub mod state;
