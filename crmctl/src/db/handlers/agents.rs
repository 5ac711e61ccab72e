//! Database repository for agents, scoped to one organisation.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::{
        accounts::AccountUpdateDBRequest,
        agents::{AgentCreateDBRequest, AgentDBResponse, AgentFilter},
    },
};
use crate::types::{AgentId, OrganisationId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub(crate) const SELECT_AGENTS: &str = r#"
    SELECT agents.id, agents.account_id, agents.organisation_id,
           accounts.username, accounts.email, accounts.first_name, accounts.last_name,
           agents.created_at
    FROM agents
    JOIN accounts ON accounts.id = agents.account_id"#;

pub struct Agents<'c> {
    db: &'c mut PgConnection,
    organisation_id: OrganisationId,
}

impl<'c> Agents<'c> {
    pub fn new(db: &'c mut PgConnection, organisation_id: OrganisationId) -> Self {
        Self { db, organisation_id }
    }

    #[instrument(skip(self), fields(organisation_id = %abbrev_uuid(&self.organisation_id)), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM agents WHERE organisation_id = $1")
            .bind(self.organisation_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Agents<'c> {
    type CreateRequest = AgentCreateDBRequest;
    type UpdateRequest = AccountUpdateDBRequest;
    type Response = AgentDBResponse;
    type Id = AgentId;
    type Filter = AgentFilter;

    #[instrument(skip(self, request), fields(organisation_id = %abbrev_uuid(&self.organisation_id), account_id = %abbrev_uuid(&request.account_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let agent_id = Uuid::new_v4();
        sqlx::query("INSERT INTO agents (id, account_id, organisation_id) VALUES ($1, $2, $3)")
            .bind(agent_id)
            .bind(request.account_id)
            .bind(self.organisation_id)
            .execute(&mut *self.db)
            .await?;

        let agent = sqlx::query_as::<_, AgentDBResponse>(&format!("{SELECT_AGENTS} WHERE agents.id = $1"))
            .bind(agent_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(agent)
    }

    #[instrument(skip(self), fields(agent_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let agent = sqlx::query_as::<_, AgentDBResponse>(&format!("{SELECT_AGENTS} WHERE agents.id = $1 AND agents.organisation_id = $2"))
            .bind(id)
            .bind(self.organisation_id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(agent)
    }

    #[instrument(skip(self, filter), fields(organisation_id = %abbrev_uuid(&self.organisation_id), limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let agents = sqlx::query_as::<_, AgentDBResponse>(&format!(
            "{SELECT_AGENTS} WHERE agents.organisation_id = $1 ORDER BY agents.created_at, agents.id LIMIT $2 OFFSET $3"
        ))
        .bind(self.organisation_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(agents)
    }

    /// Deletes the agent's account; the agent row goes with it and its leads are unassigned
    #[instrument(skip(self), fields(agent_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            USING agents
            WHERE agents.account_id = accounts.id
              AND agents.id = $1
              AND agents.organisation_id = $2
            "#,
        )
        .bind(id)
        .bind(self.organisation_id)
        .execute(&mut *self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(agent_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Option<Self::Response>> {
        let agent = sqlx::query_as::<_, AgentDBResponse>(
            r#"
            UPDATE accounts SET
                username = COALESCE($3, accounts.username),
                email = COALESCE($4, accounts.email),
                first_name = COALESCE($5, accounts.first_name),
                last_name = COALESCE($6, accounts.last_name),
                updated_at = NOW()
            FROM agents
            WHERE agents.account_id = accounts.id
              AND agents.id = $1
              AND agents.organisation_id = $2
            RETURNING agents.id, agents.account_id, agents.organisation_id,
                      accounts.username, accounts.email, accounts.first_name, accounts.last_name,
                      agents.created_at
            "#,
        )
        .bind(id)
        .bind(self.organisation_id)
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(agent)
    }
}
