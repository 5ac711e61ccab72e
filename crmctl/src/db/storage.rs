//! The storage seam between the access engine and the relational store.
//!
//! The engine never reaches a table directly: it computes a scope for the
//! actor and hands it to one of these methods, which must apply it in the
//! same statement as the read or write. Single-row methods return `None` /
//! `false` when the row does not exist *or* falls outside the scope.

use crate::db::errors::Result;
use crate::db::models::{
    accounts::{AccountCreateDBRequest, AccountDBResponse, AccountUpdateDBRequest},
    agents::{AgentDBResponse, AgentFilter},
    categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryFilter, CategoryUpdateDBRequest},
    leads::{LeadCreateDBRequest, LeadDBResponse, LeadFilter, LeadScope, LeadUpdateDBRequest},
    organisations::OrganisationDBResponse,
};
use crate::types::{AccountId, AgentId, CategoryId, LeadId, OrganisationId};
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    // Accounts and profiles

    /// Create an organisor account and its organisation in one transaction
    async fn create_organisor(&self, request: &AccountCreateDBRequest) -> Result<(AccountDBResponse, OrganisationDBResponse)>;

    /// Return the organisation owned by `owner`, creating it if it does not exist yet
    async fn ensure_organisation(&self, owner: AccountId) -> Result<OrganisationDBResponse>;

    async fn get_account(&self, id: AccountId) -> Result<Option<AccountDBResponse>>;

    async fn get_account_by_username(&self, username: &str) -> Result<Option<AccountDBResponse>>;

    async fn get_organisation_by_owner(&self, owner: AccountId) -> Result<Option<OrganisationDBResponse>>;

    async fn get_agent_by_account(&self, account: AccountId) -> Result<Option<AgentDBResponse>>;

    // Agents

    /// Create an agent account and link it into `organisation` in one transaction
    async fn create_agent(&self, organisation: OrganisationId, account: &AccountCreateDBRequest) -> Result<AgentDBResponse>;

    async fn list_agents(&self, organisation: OrganisationId, filter: &AgentFilter) -> Result<Vec<AgentDBResponse>>;

    async fn count_agents(&self, organisation: OrganisationId) -> Result<i64>;

    async fn get_agent(&self, organisation: OrganisationId, id: AgentId) -> Result<Option<AgentDBResponse>>;

    /// Update the profile fields of the agent's account
    async fn update_agent(
        &self,
        organisation: OrganisationId,
        id: AgentId,
        request: &AccountUpdateDBRequest,
    ) -> Result<Option<AgentDBResponse>>;

    /// Delete the agent together with its account. Leads assigned to the agent
    /// survive with no agent.
    async fn delete_agent(&self, organisation: OrganisationId, id: AgentId) -> Result<bool>;

    // Categories

    async fn create_category(&self, organisation: OrganisationId, request: &CategoryCreateDBRequest) -> Result<CategoryDBResponse>;

    async fn list_categories(&self, organisation: OrganisationId, filter: &CategoryFilter) -> Result<Vec<CategoryDBResponse>>;

    async fn get_category(&self, organisation: OrganisationId, id: CategoryId) -> Result<Option<CategoryDBResponse>>;

    async fn update_category(
        &self,
        organisation: OrganisationId,
        id: CategoryId,
        request: &CategoryUpdateDBRequest,
    ) -> Result<Option<CategoryDBResponse>>;

    /// Delete a category. Leads filed under it survive with no category.
    async fn delete_category(&self, organisation: OrganisationId, id: CategoryId) -> Result<bool>;

    // Leads

    /// Create a lead in `scope.organisation_id`
    async fn create_lead(&self, scope: &LeadScope, request: &LeadCreateDBRequest) -> Result<LeadDBResponse>;

    async fn list_leads(&self, scope: &LeadScope, filter: &LeadFilter) -> Result<Vec<LeadDBResponse>>;

    /// Count the leads matching `filter`, ignoring its `skip` and `limit`
    async fn count_leads(&self, scope: &LeadScope, filter: &LeadFilter) -> Result<i64>;

    async fn get_lead(&self, scope: &LeadScope, id: LeadId) -> Result<Option<LeadDBResponse>>;

    async fn update_lead(&self, scope: &LeadScope, id: LeadId, request: &LeadUpdateDBRequest) -> Result<Option<LeadDBResponse>>;

    async fn delete_lead(&self, scope: &LeadScope, id: LeadId) -> Result<bool>;
}
