//! API request/response models for lead categories.

use super::leads::LeadResponse;
use crate::db::models::categories::CategoryDBResponse;
use crate::types::{CategoryId, OrganisationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CategoryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    #[schema(value_type = String, format = "uuid")]
    pub organisation_id: OrganisationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryDBResponse> for CategoryResponse {
    fn from(db: CategoryDBResponse) -> Self {
        Self {
            id: db.id,
            organisation_id: db.organisation_id,
            name: db.name,
            created_at: db.created_at,
        }
    }
}

/// Category list plus lead counts, computed over the leads the caller can see
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDashboardResponse {
    pub categories: Vec<CategoryResponse>,
    /// Visible leads with no category
    pub unassigned_lead_count: i64,
    /// Visible leads in a category named "Contacted"
    pub contacted_lead_count: i64,
    /// Visible leads in a category named "Converted"
    pub converted_lead_count: i64,
}

/// A category with the visible leads filed under it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetailResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub leads: Vec<LeadResponse>,
}
