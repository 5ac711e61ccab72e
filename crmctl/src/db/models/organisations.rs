//! Database models for organisations.

use crate::types::{AccountId, OrganisationId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// An organisation is the profile of exactly one organisor account
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrganisationDBResponse {
    pub id: OrganisationId,
    pub owner_id: AccountId,
    pub created_at: DateTime<Utc>,
}
