//! [`Storage`] backed by a PostgreSQL pool and the repositories in [`super::handlers`].

use crate::db::{
    errors::Result,
    handlers::{Accounts, Agents, Categories, Leads, Organisations, Repository},
    models::{
        accounts::{AccountCreateDBRequest, AccountDBResponse, AccountUpdateDBRequest},
        agents::{AgentCreateDBRequest, AgentDBResponse, AgentFilter},
        categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryFilter, CategoryUpdateDBRequest},
        leads::{LeadCreateDBRequest, LeadDBResponse, LeadFilter, LeadScope, LeadUpdateDBRequest},
        organisations::OrganisationDBResponse,
    },
    storage::Storage,
};
use crate::types::{AccountId, AgentId, CategoryId, LeadId, OrganisationId};
use async_trait::async_trait;
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn create_organisor(&self, request: &AccountCreateDBRequest) -> Result<(AccountDBResponse, OrganisationDBResponse)> {
        let mut tx = self.pool.begin().await?;
        let account = Accounts::new(&mut tx).create(request).await?;
        let organisation = Organisations::new(&mut tx).create(account.id).await?;
        tx.commit().await?;
        Ok((account, organisation))
    }

    async fn ensure_organisation(&self, owner: AccountId) -> Result<OrganisationDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Organisations::new(&mut conn).ensure(owner).await
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<AccountDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Accounts::new(&mut conn).get_by_id(id).await
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<AccountDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Accounts::new(&mut conn).get_by_username(username).await
    }

    async fn get_organisation_by_owner(&self, owner: AccountId) -> Result<Option<OrganisationDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Organisations::new(&mut conn).get_by_owner(owner).await
    }

    async fn get_agent_by_account(&self, account: AccountId) -> Result<Option<AgentDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Accounts::new(&mut conn).agent_profile(account).await
    }

    async fn create_agent(&self, organisation: OrganisationId, account: &AccountCreateDBRequest) -> Result<AgentDBResponse> {
        let mut tx = self.pool.begin().await?;
        let account = Accounts::new(&mut tx).create(account).await?;
        let agent = Agents::new(&mut tx, organisation)
            .create(&AgentCreateDBRequest { account_id: account.id })
            .await?;
        tx.commit().await?;
        Ok(agent)
    }

    async fn list_agents(&self, organisation: OrganisationId, filter: &AgentFilter) -> Result<Vec<AgentDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Agents::new(&mut conn, organisation).list(filter).await
    }

    async fn count_agents(&self, organisation: OrganisationId) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Agents::new(&mut conn, organisation).count().await
    }

    async fn get_agent(&self, organisation: OrganisationId, id: AgentId) -> Result<Option<AgentDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Agents::new(&mut conn, organisation).get_by_id(id).await
    }

    async fn update_agent(
        &self,
        organisation: OrganisationId,
        id: AgentId,
        request: &AccountUpdateDBRequest,
    ) -> Result<Option<AgentDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Agents::new(&mut conn, organisation).update(id, request).await
    }

    async fn delete_agent(&self, organisation: OrganisationId, id: AgentId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        let deleted = Agents::new(&mut tx, organisation).delete(id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn create_category(&self, organisation: OrganisationId, request: &CategoryCreateDBRequest) -> Result<CategoryDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Categories::new(&mut conn, organisation).create(request).await
    }

    async fn list_categories(&self, organisation: OrganisationId, filter: &CategoryFilter) -> Result<Vec<CategoryDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Categories::new(&mut conn, organisation).list(filter).await
    }

    async fn get_category(&self, organisation: OrganisationId, id: CategoryId) -> Result<Option<CategoryDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Categories::new(&mut conn, organisation).get_by_id(id).await
    }

    async fn update_category(
        &self,
        organisation: OrganisationId,
        id: CategoryId,
        request: &CategoryUpdateDBRequest,
    ) -> Result<Option<CategoryDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Categories::new(&mut conn, organisation).update(id, request).await
    }

    async fn delete_category(&self, organisation: OrganisationId, id: CategoryId) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Categories::new(&mut conn, organisation).delete(id).await
    }

    async fn create_lead(&self, scope: &LeadScope, request: &LeadCreateDBRequest) -> Result<LeadDBResponse> {
        let mut conn = self.pool.acquire().await?;
        Leads::new(&mut conn, *scope).create(request).await
    }

    async fn list_leads(&self, scope: &LeadScope, filter: &LeadFilter) -> Result<Vec<LeadDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Leads::new(&mut conn, *scope).list(filter).await
    }

    async fn count_leads(&self, scope: &LeadScope, filter: &LeadFilter) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Leads::new(&mut conn, *scope).count(filter).await
    }

    async fn get_lead(&self, scope: &LeadScope, id: LeadId) -> Result<Option<LeadDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Leads::new(&mut conn, *scope).get_by_id(id).await
    }

    async fn update_lead(&self, scope: &LeadScope, id: LeadId, request: &LeadUpdateDBRequest) -> Result<Option<LeadDBResponse>> {
        let mut conn = self.pool.acquire().await?;
        Leads::new(&mut conn, *scope).update(id, request).await
    }

    async fn delete_lead(&self, scope: &LeadScope, id: LeadId) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        Leads::new(&mut conn, *scope).delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::accounts::{CurrentUser, Role};

    #[sqlx::test]
    #[test_log::test]
    async fn test_signup_creates_exactly_one_organisation(pool: PgPool) {
        let storage = PostgresStorage::new(pool);
        let (account, organisation) = storage
            .create_organisor(&AccountCreateDBRequest {
                username: "owner".to_string(),
                email: "owner@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role: Role::Organisor,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(organisation.owner_id, account.id);
        assert_eq!(storage.ensure_organisation(account.id).await.unwrap(), organisation);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organisations WHERE owner_id = $1")
            .bind(account.id)
            .fetch_one(storage.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_engine_scopes_leads_in_sql(pool: PgPool) {
        use crate::access::AccessEngine;
        use crate::api::models::pagination::Pagination;
        use crate::test_utils::{RecordingNotifier, agent_request, create_test_config, lead_request, register_request};
        use std::sync::Arc;

        let storage = Arc::new(PostgresStorage::new(pool));
        let engine = AccessEngine::new(storage.clone(), Arc::new(RecordingNotifier::default()), &create_test_config());

        let owner = engine.register_organisor(register_request("acme")).await.unwrap();
        let acme = engine.resolve_actor(&CurrentUser::from(&owner)).await.unwrap();
        let agent = engine.create_agent(&acme, agent_request("a1")).await.unwrap();
        let agent_account = storage.get_account_by_username("a1").await.unwrap().unwrap();
        let a1 = engine.resolve_actor(&CurrentUser::from(&agent_account)).await.unwrap();

        let assigned = engine.create_lead(&acme, lead_request("L1", Some(agent.id))).await.unwrap();
        let free = engine.create_lead(&acme, lead_request("L2", None)).await.unwrap();

        let as_organisor = engine.list_leads(&acme, &Pagination::default()).await.unwrap();
        assert_eq!(as_organisor.total_count, 2);
        let unassigned: Vec<_> = as_organisor.unassigned_leads.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(unassigned, vec![free.id]);

        let as_agent = engine.list_leads(&a1, &Pagination::default()).await.unwrap();
        assert_eq!(as_agent.data.iter().map(|l| l.id).collect::<Vec<_>>(), vec![assigned.id]);
        assert!(engine.get_lead(&a1, free.id).await.is_err());

        engine.delete_agent(&acme, agent.id).await.unwrap();
        let triage = engine.unassigned_leads(&acme, &Pagination::default()).await.unwrap();
        assert_eq!(triage.total_count, 2);
        assert!(engine.resolve_actor(&CurrentUser::from(&agent_account)).await.is_err());
    }
}
