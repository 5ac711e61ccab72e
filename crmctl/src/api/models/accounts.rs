//! API request/response models for accounts and the authenticated actor.

use crate::db::models::accounts::AccountDBResponse;
use crate::errors::Error;
use crate::types::{AccountId, AgentId, OrganisationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What an account is allowed to be. Fixed when the account is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "account_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Organisor,
    Agent,
}

impl Role {
    /// Build a role from the legacy `is_organisor` / `is_agent` flag pair.
    ///
    /// Exactly one flag must be set.
    pub fn from_flags(is_organisor: bool, is_agent: bool) -> Result<Self, Error> {
        match (is_organisor, is_agent) {
            (true, false) => Ok(Role::Organisor),
            (false, true) => Ok(Role::Agent),
            (true, true) => Err(Error::validation("An account cannot be both an organisor and an agent")),
            (false, false) => Err(Error::validation("An account must be either an organisor or an agent")),
        }
    }

    pub fn is_organisor(&self) -> bool {
        matches!(self, Role::Organisor)
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Role::Agent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_organisor: bool,
    pub is_agent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AccountDBResponse> for AccountResponse {
    fn from(db: AccountDBResponse) -> Self {
        Self {
            id: db.id,
            is_organisor: db.is_organisor(),
            is_agent: db.is_agent(),
            username: db.username,
            email: db.email,
            first_name: db.first_name,
            last_name: db.last_name,
            role: db.role,
            created_at: db.created_at,
        }
    }
}

/// Identity carried by a verified session token.
///
/// This says who is calling. What they may touch is decided by the access
/// engine once the identity is resolved to an [`crate::access::Actor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: AccountId,
    pub username: String,
    pub role: Role,
}

impl From<&AccountDBResponse> for CurrentUser {
    fn from(account: &AccountDBResponse) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            role: account.role,
        }
    }
}

/// The authenticated actor, as seen by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub account: AccountResponse,
    /// The organisation the actor works in
    #[schema(value_type = String, format = "uuid")]
    pub organisation_id: OrganisationId,
    /// Set for agents only
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub agent_id: Option<AgentId>,
}
