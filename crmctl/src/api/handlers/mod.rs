//! HTTP request handlers for all API endpoints.
//!
//! Handlers are thin: they extract the caller as an [`crate::access::Actor`],
//! hand the request to the [`crate::access::AccessEngine`] and serialize what
//! comes back. Scoping and validation happen in the engine.
//!
//! # Handler Modules
//!
//! - [`auth`]: signup, login and logout
//! - [`me`]: the authenticated actor
//! - [`leads`]: lead CRUD, assignment and categorisation
//! - [`categories`]: the category dashboard and category management
//! - [`agents`]: agent provisioning and management

pub mod agents;
pub mod auth;
pub mod categories;
pub mod leads;
pub mod me;
