//! Database models for leads, and the row predicates that scope them.

use crate::types::{AgentId, CategoryId, LeadId, OrganisationId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The set of leads a statement may touch.
///
/// Every lead query carries one. `agent_id: None` means the whole organisation;
/// `Some(agent)` narrows it to leads assigned to that agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadScope {
    pub organisation_id: OrganisationId,
    pub agent_id: Option<AgentId>,
}

impl LeadScope {
    pub fn organisation(organisation_id: OrganisationId) -> Self {
        Self {
            organisation_id,
            agent_id: None,
        }
    }

    pub fn assigned_to(organisation_id: OrganisationId, agent_id: AgentId) -> Self {
        Self {
            organisation_id,
            agent_id: Some(agent_id),
        }
    }

    /// Whether a lead row falls inside this scope
    pub fn contains(&self, lead: &LeadDBResponse) -> bool {
        lead.organisation_id == self.organisation_id && self.agent_id.is_none_or(|agent| lead.agent_id == Some(agent))
    }
}

/// Narrowing by category applied on top of a [`LeadScope`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeadCategoryFilter {
    #[default]
    Any,
    Is(CategoryId),
    Uncategorised,
    /// Category name, matched exactly
    Named(String),
}

/// Filter for listing and counting leads inside a [`LeadScope`]
#[derive(Debug, Clone)]
pub struct LeadFilter {
    /// Only leads with no agent assigned
    pub unassigned_only: bool,
    pub category: LeadCategoryFilter,
    pub skip: i64,
    pub limit: i64,
}

impl LeadFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            unassigned_only: false,
            category: LeadCategoryFilter::Any,
            skip,
            limit,
        }
    }

    pub fn unassigned(mut self) -> Self {
        self.unassigned_only = true;
        self
    }

    pub fn in_category(mut self, category: LeadCategoryFilter) -> Self {
        self.category = category;
        self
    }

    /// Whether a lead row passes this filter, scope aside
    pub fn matches(&self, lead: &LeadDBResponse, category_name: Option<&str>) -> bool {
        if self.unassigned_only && lead.agent_id.is_some() {
            return false;
        }
        match &self.category {
            LeadCategoryFilter::Any => true,
            LeadCategoryFilter::Is(id) => lead.category_id == Some(*id),
            LeadCategoryFilter::Uncategorised => lead.category_id.is_none(),
            LeadCategoryFilter::Named(name) => category_name == Some(name.as_str()),
        }
    }
}

/// Database request for creating a lead. The organisation is never part of the
/// request; it comes from the scope the lead is created in.
#[derive(Debug, Clone)]
pub struct LeadCreateDBRequest {
    pub agent_id: Option<AgentId>,
    pub category_id: Option<CategoryId>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub description: String,
    pub phone_number: String,
    pub email: String,
}

/// Database request for updating a lead. For the nullable references the outer
/// `Option` says whether to touch the column, the inner one is the new value.
#[derive(Debug, Clone, Default)]
pub struct LeadUpdateDBRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub agent_id: Option<Option<AgentId>>,
    pub category_id: Option<Option<CategoryId>>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LeadDBResponse {
    pub id: LeadId,
    pub organisation_id: OrganisationId,
    pub agent_id: Option<AgentId>,
    pub category_id: Option<CategoryId>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub description: String,
    pub phone_number: String,
    pub email: String,
    pub date_added: DateTime<Utc>,
}
