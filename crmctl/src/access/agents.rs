//! Agent provisioning and management. Organisor only.

use tracing::instrument;

use super::{AccessEngine, Actor, validation};
use crate::api::models::accounts::Role;
use crate::api::models::agents::{AgentCreate, AgentResponse, AgentUpdate};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::auth::password::generate_initial_password;
use crate::db::models::accounts::{AccountCreateDBRequest, AccountUpdateDBRequest};
use crate::db::models::agents::AgentFilter;
use crate::errors::{Error, Result};
use crate::notifications::Notification;
use crate::types::{AgentId, Operation, Resource, abbrev_uuid};

const INVITATION_SUBJECT: &str = "You are invited to be an agent";

impl AccessEngine {
    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&actor.account.id)), err)]
    pub async fn list_agents(&self, actor: &Actor, pagination: &Pagination) -> Result<PaginatedResponse<AgentResponse>> {
        let organisation_id = self.permit(actor, Resource::Agents, Operation::List)?.organisation_id();
        let (skip, limit) = pagination.params();

        let agents = self.storage.list_agents(organisation_id, &AgentFilter::new(skip, limit)).await?;
        let total_count = self.storage.count_agents(organisation_id).await?;

        Ok(PaginatedResponse::new(
            agents.into_iter().map(AgentResponse::from).collect(),
            total_count,
            skip,
            limit,
        ))
    }

    #[instrument(skip_all, fields(agent_id = %abbrev_uuid(&id)), err)]
    pub async fn get_agent(&self, actor: &Actor, id: AgentId) -> Result<AgentResponse> {
        let organisation_id = self.permit_row(actor, Resource::Agents, Operation::Read, id)?.organisation_id();
        let agent = self
            .storage
            .get_agent(organisation_id, id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Agents, id))?;
        Ok(agent.into())
    }

    /// Provision an agent account with a random password and invite them by email
    #[instrument(skip_all, fields(username = %request.username), err)]
    pub async fn create_agent(&self, actor: &Actor, request: AgentCreate) -> Result<AgentResponse> {
        let organisation_id = self.permit(actor, Resource::Agents, Operation::Create)?.organisation_id();

        let username = validation::bounded("username", &request.username, validation::USERNAME_MAX)?;
        let email = validation::email(&request.email)?;
        let first_name = validation::at_most("first name", &request.first_name, validation::ACCOUNT_NAME_MAX)?;
        let last_name = validation::at_most("last name", &request.last_name, validation::ACCOUNT_NAME_MAX)?;

        // Nobody learns this password; the agent is expected to have it reset
        let password_hash = self.hash_password(generate_initial_password()).await?;

        let agent = self
            .storage
            .create_agent(
                organisation_id,
                &AccountCreateDBRequest {
                    username,
                    email,
                    first_name,
                    last_name,
                    role: Role::Agent,
                    password_hash,
                },
            )
            .await?;
        tracing::info!(agent_id = %abbrev_uuid(&agent.id), organisation_id = %abbrev_uuid(&organisation_id), "Agent created");

        self.notify(Notification::new(
            INVITATION_SUBJECT,
            format!(
                "You were added as an agent on {}. Please come login to start working.",
                self.notifications.site_name
            ),
            self.notifications.invitation_from.clone(),
            vec![agent.email.clone()],
        ));

        Ok(agent.into())
    }

    /// Update the account details of an agent in the actor's organisation
    #[instrument(skip_all, fields(agent_id = %abbrev_uuid(&id)), err)]
    pub async fn update_agent(&self, actor: &Actor, id: AgentId, request: AgentUpdate) -> Result<AgentResponse> {
        let organisation_id = self.permit_row(actor, Resource::Agents, Operation::Update, id)?.organisation_id();

        let update = AccountUpdateDBRequest {
            username: validation::optional_bounded("username", request.username.as_deref(), validation::USERNAME_MAX)?,
            email: validation::optional_email(request.email.as_deref())?,
            first_name: request
                .first_name
                .as_deref()
                .map(|v| validation::at_most("first name", v, validation::ACCOUNT_NAME_MAX))
                .transpose()?,
            last_name: request
                .last_name
                .as_deref()
                .map(|v| validation::at_most("last name", v, validation::ACCOUNT_NAME_MAX))
                .transpose()?,
        };

        let agent = self
            .storage
            .update_agent(organisation_id, id, &update)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Agents, id))?;
        Ok(agent.into())
    }

    /// Remove an agent and its account. Its leads stay in the organisation, unassigned.
    #[instrument(skip_all, fields(agent_id = %abbrev_uuid(&id)), err)]
    pub async fn delete_agent(&self, actor: &Actor, id: AgentId) -> Result<()> {
        let organisation_id = self.permit_row(actor, Resource::Agents, Operation::Delete, id)?.organisation_id();
        if !self.storage.delete_agent(organisation_id, id).await? {
            return Err(Error::not_found(Resource::Agents, id));
        }
        tracing::info!("Agent deleted");
        Ok(())
    }
}
