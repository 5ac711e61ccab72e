//! API request/response models for agents.

use crate::db::models::agents::AgentDBResponse;
use crate::types::{AccountId, AgentId, OrganisationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Invite a new agent. The account is provisioned with a random password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentCreate {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AgentUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AgentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AgentId,
    #[schema(value_type = String, format = "uuid")]
    pub account_id: AccountId,
    #[schema(value_type = String, format = "uuid")]
    pub organisation_id: OrganisationId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<AgentDBResponse> for AgentResponse {
    fn from(db: AgentDBResponse) -> Self {
        Self {
            id: db.id,
            account_id: db.account_id,
            organisation_id: db.organisation_id,
            username: db.username,
            email: db.email,
            first_name: db.first_name,
            last_name: db.last_name,
            created_at: db.created_at,
        }
    }
}
