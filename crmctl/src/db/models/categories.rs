//! Database models for lead categories.

use crate::types::{CategoryId, OrganisationId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct CategoryCreateDBRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryUpdateDBRequest {
    pub name: Option<String>,
}

/// Filter for listing the categories of one organisation
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pub skip: i64,
    pub limit: i64,
}

impl CategoryFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryDBResponse {
    pub id: CategoryId,
    pub organisation_id: OrganisationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
