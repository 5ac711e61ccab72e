//! API request and response models.
//!
//! These define the public JSON contract and are kept separate from the
//! storage models in [`crate::db::models`]. All of them derive `utoipa`
//! schemas for the OpenAPI document.
//!
//! - [`accounts`]: account views, the [`accounts::Role`] enum and `/me`
//! - [`auth`]: login, signup and logout payloads
//! - [`leads`], [`categories`], [`agents`]: the scoped CRM resources
//! - [`pagination`]: shared `skip`/`limit` parameters

pub mod accounts;
pub mod agents;
pub mod auth;
pub mod categories;
pub mod leads;
pub mod pagination;
