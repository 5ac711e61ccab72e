//! Database models for agents.

use crate::types::{AccountId, AgentId, OrganisationId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for linking an existing agent account into an organisation
#[derive(Debug, Clone)]
pub struct AgentCreateDBRequest {
    pub account_id: AccountId,
}

/// Filter for listing agents of one organisation
#[derive(Debug, Clone)]
pub struct AgentFilter {
    pub skip: i64,
    pub limit: i64,
}

impl AgentFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

/// An agent joined with the account it belongs to
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AgentDBResponse {
    pub id: AgentId,
    pub account_id: AccountId,
    pub organisation_id: OrganisationId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}
