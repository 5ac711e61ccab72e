//! In-process [`Storage`] used by `database.type: memory` and by the test suite.
//!
//! Tables are plain vectors behind one `RwLock`, so every method sees and
//! mutates a consistent snapshot, which gives the multi-row writes the same
//! all-or-nothing behaviour as the Postgres transactions. The schema's unique
//! constraints, foreign keys and `ON DELETE` rules are reproduced by hand.

use crate::db::{
    errors::{DbError, Result},
    models::{
        accounts::{AccountCreateDBRequest, AccountDBResponse, AccountUpdateDBRequest},
        agents::{AgentDBResponse, AgentFilter},
        categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryFilter, CategoryUpdateDBRequest},
        leads::{LeadCreateDBRequest, LeadDBResponse, LeadFilter, LeadScope, LeadUpdateDBRequest},
        organisations::OrganisationDBResponse,
    },
    storage::Storage,
};
use crate::types::{AccountId, AgentId, CategoryId, LeadId, OrganisationId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct AgentRow {
    id: AgentId,
    account_id: AccountId,
    organisation_id: OrganisationId,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    accounts: Vec<AccountDBResponse>,
    organisations: Vec<OrganisationDBResponse>,
    agents: Vec<AgentRow>,
    categories: Vec<CategoryDBResponse>,
    leads: Vec<LeadDBResponse>,
}

impl Tables {
    fn insert_account(&mut self, request: &AccountCreateDBRequest) -> Result<AccountDBResponse> {
        if self.accounts.iter().any(|a| a.username == request.username) {
            return Err(DbError::unique("accounts", "accounts_username_key"));
        }
        if self.accounts.iter().any(|a| a.email == request.email) {
            return Err(DbError::unique("accounts", "accounts_email_key"));
        }
        let now = Utc::now();
        let account = AccountDBResponse {
            id: Uuid::new_v4(),
            username: request.username.clone(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            role: request.role,
            password_hash: request.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        self.accounts.push(account.clone());
        Ok(account)
    }

    fn insert_organisation(&mut self, owner: AccountId) -> Result<OrganisationDBResponse> {
        if !self.accounts.iter().any(|a| a.id == owner) {
            return Err(DbError::foreign_key("organisations", "organisations_owner_id_fkey"));
        }
        if self.organisations.iter().any(|o| o.owner_id == owner) {
            return Err(DbError::unique("organisations", "organisations_owner_id_key"));
        }
        let organisation = OrganisationDBResponse {
            id: Uuid::new_v4(),
            owner_id: owner,
            created_at: Utc::now(),
        };
        self.organisations.push(organisation.clone());
        Ok(organisation)
    }

    fn agent_view(&self, row: &AgentRow) -> Result<AgentDBResponse> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.id == row.account_id)
            .ok_or_else(|| DbError::Other(anyhow::anyhow!("agent {} has no account", row.id)))?;
        Ok(AgentDBResponse {
            id: row.id,
            account_id: row.account_id,
            organisation_id: row.organisation_id,
            username: account.username.clone(),
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            created_at: row.created_at,
        })
    }

    fn agent_in(&self, organisation: OrganisationId, id: AgentId) -> Option<&AgentRow> {
        self.agents.iter().find(|a| a.id == id && a.organisation_id == organisation)
    }

    fn category_name(&self, id: Option<CategoryId>) -> Option<&str> {
        let id = id?;
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    fn check_lead_references(&self, agent_id: Option<AgentId>, category_id: Option<CategoryId>) -> Result<()> {
        if agent_id.is_some_and(|id| !self.agents.iter().any(|a| a.id == id)) {
            return Err(DbError::foreign_key("leads", "leads_agent_id_fkey"));
        }
        if category_id.is_some_and(|id| !self.categories.iter().any(|c| c.id == id)) {
            return Err(DbError::foreign_key("leads", "leads_category_id_fkey"));
        }
        Ok(())
    }

    /// Remove agents and apply `ON DELETE SET NULL` to their leads
    fn remove_agents(&mut self, doomed: impl Fn(&AgentRow) -> bool) {
        let removed: Vec<AgentId> = self.agents.iter().filter(|a| doomed(a)).map(|a| a.id).collect();
        self.agents.retain(|a| !removed.contains(&a.id));
        for lead in &mut self.leads {
            if lead.agent_id.is_some_and(|id| removed.contains(&id)) {
                lead.agent_id = None;
            }
        }
    }

    /// Remove an account and everything that cascades from it
    fn remove_account(&mut self, id: AccountId) {
        self.accounts.retain(|a| a.id != id);
        self.remove_agents(|a| a.account_id == id);

        let owned: Vec<OrganisationId> = self.organisations.iter().filter(|o| o.owner_id == id).map(|o| o.id).collect();
        if owned.is_empty() {
            return;
        }
        self.organisations.retain(|o| !owned.contains(&o.id));
        // Agent rows go, their accounts stay behind as they do in Postgres
        self.remove_agents(|a| owned.contains(&a.organisation_id));
        self.categories.retain(|c| !owned.contains(&c.organisation_id));
        self.leads.retain(|l| !owned.contains(&l.organisation_id));
    }
}

/// Storage held entirely in memory. Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete an account with the same cascade rules as the schema
    pub async fn delete_account(&self, id: AccountId) -> bool {
        let mut tables = self.tables.write().await;
        let existed = tables.accounts.iter().any(|a| a.id == id);
        tables.remove_account(id);
        existed
    }
}

fn page<T>(rows: impl Iterator<Item = T>, skip: i64, limit: i64) -> Vec<T> {
    rows.skip(skip.max(0) as usize).take(limit.max(0) as usize).collect()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_organisor(&self, request: &AccountCreateDBRequest) -> Result<(AccountDBResponse, OrganisationDBResponse)> {
        let mut tables = self.tables.write().await;
        let account = tables.insert_account(request)?;
        match tables.insert_organisation(account.id) {
            Ok(organisation) => Ok((account, organisation)),
            Err(e) => {
                tables.accounts.retain(|a| a.id != account.id);
                Err(e)
            }
        }
    }

    async fn ensure_organisation(&self, owner: AccountId) -> Result<OrganisationDBResponse> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.organisations.iter().find(|o| o.owner_id == owner) {
            return Ok(existing.clone());
        }
        tables.insert_organisation(owner)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<AccountDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<AccountDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn get_organisation_by_owner(&self, owner: AccountId) -> Result<Option<OrganisationDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.organisations.iter().find(|o| o.owner_id == owner).cloned())
    }

    async fn get_agent_by_account(&self, account: AccountId) -> Result<Option<AgentDBResponse>> {
        let tables = self.tables.read().await;
        tables
            .agents
            .iter()
            .find(|a| a.account_id == account)
            .map(|row| tables.agent_view(row))
            .transpose()
    }

    async fn create_agent(&self, organisation: OrganisationId, account: &AccountCreateDBRequest) -> Result<AgentDBResponse> {
        let mut tables = self.tables.write().await;
        if !tables.organisations.iter().any(|o| o.id == organisation) {
            return Err(DbError::foreign_key("agents", "agents_organisation_id_fkey"));
        }
        let account = tables.insert_account(account)?;
        let row = AgentRow {
            id: Uuid::new_v4(),
            account_id: account.id,
            organisation_id: organisation,
            created_at: Utc::now(),
        };
        tables.agents.push(row.clone());
        tables.agent_view(&row)
    }

    async fn list_agents(&self, organisation: OrganisationId, filter: &AgentFilter) -> Result<Vec<AgentDBResponse>> {
        let tables = self.tables.read().await;
        page(
            tables.agents.iter().filter(|a| a.organisation_id == organisation),
            filter.skip,
            filter.limit,
        )
        .into_iter()
        .map(|row| tables.agent_view(row))
        .collect()
    }

    async fn count_agents(&self, organisation: OrganisationId) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.agents.iter().filter(|a| a.organisation_id == organisation).count() as i64)
    }

    async fn get_agent(&self, organisation: OrganisationId, id: AgentId) -> Result<Option<AgentDBResponse>> {
        let tables = self.tables.read().await;
        tables.agent_in(organisation, id).map(|row| tables.agent_view(row)).transpose()
    }

    async fn update_agent(
        &self,
        organisation: OrganisationId,
        id: AgentId,
        request: &AccountUpdateDBRequest,
    ) -> Result<Option<AgentDBResponse>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.agent_in(organisation, id).cloned() else {
            return Ok(None);
        };
        let taken = |value: &Option<String>, field: fn(&AccountDBResponse) -> &str| {
            value
                .as_deref()
                .is_some_and(|v| tables.accounts.iter().any(|a| a.id != row.account_id && field(a) == v))
        };
        if taken(&request.username, |a| a.username.as_str()) {
            return Err(DbError::unique("accounts", "accounts_username_key"));
        }
        if taken(&request.email, |a| a.email.as_str()) {
            return Err(DbError::unique("accounts", "accounts_email_key"));
        }
        if let Some(account) = tables.accounts.iter_mut().find(|a| a.id == row.account_id) {
            if let Some(username) = &request.username {
                account.username = username.clone();
            }
            if let Some(email) = &request.email {
                account.email = email.clone();
            }
            if let Some(first_name) = &request.first_name {
                account.first_name = first_name.clone();
            }
            if let Some(last_name) = &request.last_name {
                account.last_name = last_name.clone();
            }
            account.updated_at = Utc::now();
        }
        tables.agent_view(&row).map(Some)
    }

    async fn delete_agent(&self, organisation: OrganisationId, id: AgentId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(account_id) = tables.agent_in(organisation, id).map(|a| a.account_id) else {
            return Ok(false);
        };
        tables.remove_account(account_id);
        Ok(true)
    }

    async fn create_category(&self, organisation: OrganisationId, request: &CategoryCreateDBRequest) -> Result<CategoryDBResponse> {
        let mut tables = self.tables.write().await;
        if !tables.organisations.iter().any(|o| o.id == organisation) {
            return Err(DbError::foreign_key("categories", "categories_organisation_id_fkey"));
        }
        let category = CategoryDBResponse {
            id: Uuid::new_v4(),
            organisation_id: organisation,
            name: request.name.clone(),
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self, organisation: OrganisationId, filter: &CategoryFilter) -> Result<Vec<CategoryDBResponse>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<&CategoryDBResponse> = tables.categories.iter().filter(|c| c.organisation_id == organisation).collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page(categories.into_iter().cloned(), filter.skip, filter.limit))
    }

    async fn get_category(&self, organisation: OrganisationId, id: CategoryId) -> Result<Option<CategoryDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && c.organisation_id == organisation)
            .cloned())
    }

    async fn update_category(
        &self,
        organisation: OrganisationId,
        id: CategoryId,
        request: &CategoryUpdateDBRequest,
    ) -> Result<Option<CategoryDBResponse>> {
        let mut tables = self.tables.write().await;
        let Some(category) = tables.categories.iter_mut().find(|c| c.id == id && c.organisation_id == organisation) else {
            return Ok(None);
        };
        if let Some(name) = &request.name {
            category.name = name.clone();
        }
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, organisation: OrganisationId, id: CategoryId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| !(c.id == id && c.organisation_id == organisation));
        if tables.categories.len() == before {
            return Ok(false);
        }
        for lead in &mut tables.leads {
            if lead.category_id == Some(id) {
                lead.category_id = None;
            }
        }
        Ok(true)
    }

    async fn create_lead(&self, scope: &LeadScope, request: &LeadCreateDBRequest) -> Result<LeadDBResponse> {
        let mut tables = self.tables.write().await;
        if !tables.organisations.iter().any(|o| o.id == scope.organisation_id) {
            return Err(DbError::foreign_key("leads", "leads_organisation_id_fkey"));
        }
        tables.check_lead_references(request.agent_id, request.category_id)?;
        if request.age < 0 {
            return Err(DbError::CheckViolation {
                constraint: Some("leads_age_check".to_string()),
                table: Some("leads".to_string()),
                message: "new row for relation \"leads\" violates check constraint \"leads_age_check\"".to_string(),
            });
        }
        let lead = LeadDBResponse {
            id: Uuid::new_v4(),
            organisation_id: scope.organisation_id,
            agent_id: request.agent_id,
            category_id: request.category_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            age: request.age,
            description: request.description.clone(),
            phone_number: request.phone_number.clone(),
            email: request.email.clone(),
            date_added: Utc::now(),
        };
        tables.leads.push(lead.clone());
        Ok(lead)
    }

    async fn list_leads(&self, scope: &LeadScope, filter: &LeadFilter) -> Result<Vec<LeadDBResponse>> {
        let tables = self.tables.read().await;
        // Newest first, matching the Postgres ordering
        let rows = tables
            .leads
            .iter()
            .rev()
            .filter(|l| scope.contains(l) && filter.matches(l, tables.category_name(l.category_id)))
            .cloned();
        Ok(page(rows, filter.skip, filter.limit))
    }

    async fn count_leads(&self, scope: &LeadScope, filter: &LeadFilter) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .leads
            .iter()
            .filter(|l| scope.contains(l) && filter.matches(l, tables.category_name(l.category_id)))
            .count() as i64)
    }

    async fn get_lead(&self, scope: &LeadScope, id: LeadId) -> Result<Option<LeadDBResponse>> {
        let tables = self.tables.read().await;
        Ok(tables.leads.iter().find(|l| l.id == id && scope.contains(l)).cloned())
    }

    async fn update_lead(&self, scope: &LeadScope, id: LeadId, request: &LeadUpdateDBRequest) -> Result<Option<LeadDBResponse>> {
        let mut tables = self.tables.write().await;
        tables.check_lead_references(request.agent_id.flatten(), request.category_id.flatten())?;
        let Some(lead) = tables.leads.iter_mut().find(|l| l.id == id && scope.contains(l)) else {
            return Ok(None);
        };
        if let Some(first_name) = &request.first_name {
            lead.first_name = first_name.clone();
        }
        if let Some(last_name) = &request.last_name {
            lead.last_name = last_name.clone();
        }
        if let Some(age) = request.age {
            lead.age = age;
        }
        if let Some(description) = &request.description {
            lead.description = description.clone();
        }
        if let Some(phone_number) = &request.phone_number {
            lead.phone_number = phone_number.clone();
        }
        if let Some(email) = &request.email {
            lead.email = email.clone();
        }
        if let Some(agent_id) = request.agent_id {
            lead.agent_id = agent_id;
        }
        if let Some(category_id) = request.category_id {
            lead.category_id = category_id;
        }
        Ok(Some(lead.clone()))
    }

    async fn delete_lead(&self, scope: &LeadScope, id: LeadId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.leads.len();
        tables.leads.retain(|l| !(l.id == id && scope.contains(l)));
        Ok(tables.leads.len() < before)
    }
}
