//! API request/response models for leads.

use super::pagination::Pagination;
use crate::db::models::leads::{LeadDBResponse, LeadUpdateDBRequest};
use crate::types::{AgentId, CategoryId, LeadId, OrganisationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadCreate {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub age: i32,
    /// Agent to assign straight away; must belong to the caller's organisation
    #[serde(default)]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub agent_id: Option<AgentId>,
    #[serde(default)]
    pub description: String,
    pub phone_number: String,
    pub email: String,
}

/// Partial update. Omitted fields are left alone; `agent_id: null` unassigns the lead.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LeadUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub agent_id: Option<Option<AgentId>>,
}

impl From<LeadUpdate> for LeadUpdateDBRequest {
    fn from(update: LeadUpdate) -> Self {
        Self {
            first_name: update.first_name,
            last_name: update.last_name,
            age: update.age,
            description: update.description,
            phone_number: update.phone_number,
            email: update.email,
            agent_id: update.agent_id,
            // Category only changes through the categorise operation
            category_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadAgentAssignment {
    #[schema(value_type = String, format = "uuid")]
    pub agent_id: AgentId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadCategoryUpdate {
    /// `null` removes the lead from its category
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LeadResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: LeadId,
    #[schema(value_type = String, format = "uuid")]
    pub organisation_id: OrganisationId,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub agent_id: Option<AgentId>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub description: String,
    pub phone_number: String,
    pub email: String,
    pub date_added: DateTime<Utc>,
}

impl From<LeadDBResponse> for LeadResponse {
    fn from(db: LeadDBResponse) -> Self {
        Self {
            id: db.id,
            organisation_id: db.organisation_id,
            agent_id: db.agent_id,
            category_id: db.category_id,
            first_name: db.first_name,
            last_name: db.last_name,
            age: db.age,
            description: db.description,
            phone_number: db.phone_number,
            email: db.email,
            date_added: db.date_added,
        }
    }
}

/// Query parameters for listing leads
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListLeadsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

/// A page of visible leads. Organisors additionally get the leads of their
/// organisation that nobody is working on yet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    pub data: Vec<LeadResponse>,
    pub total_count: i64,
    pub skip: i64,
    pub limit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unassigned_leads: Option<Vec<LeadResponse>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn update_distinguishes_null_agent_from_missing_agent() {
        let update: LeadUpdate = serde_json::from_str(r#"{"first_name": "Ada"}"#).unwrap();
        assert_eq!(update.agent_id, None);

        let update: LeadUpdate = serde_json::from_str(r#"{"agent_id": null}"#).unwrap();
        assert_eq!(update.agent_id, Some(None));

        let id = Uuid::new_v4();
        let update: LeadUpdate = serde_json::from_value(serde_json::json!({ "agent_id": id })).unwrap();
        assert_eq!(update.agent_id, Some(Some(id)));
    }

    #[test]
    fn update_never_touches_category() {
        let update = LeadUpdate {
            agent_id: Some(None),
            ..Default::default()
        };
        let db: LeadUpdateDBRequest = update.into();
        assert_eq!(db.category_id, None);
        assert_eq!(db.agent_id, Some(None));
    }

    #[test]
    fn create_defaults_optional_fields() {
        let create: LeadCreate = serde_json::from_str(
            r#"{"first_name": "Ada", "last_name": "Lovelace", "phone_number": "555", "email": "ada@example.com"}"#,
        )
        .unwrap();
        assert_eq!(create.age, 0);
        assert_eq!(create.description, "");
        assert!(create.agent_id.is_none());
    }
}
