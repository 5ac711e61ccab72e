//! Lead operations.

use tracing::instrument;

use super::{ALL_ROWS, AccessEngine, Actor, validation};
use crate::api::models::agents::AgentResponse;
use crate::api::models::leads::{LeadCreate, LeadListResponse, LeadResponse, LeadUpdate};
use crate::api::models::pagination::{PaginatedResponse, Pagination};
use crate::db::models::agents::AgentFilter;
use crate::db::models::leads::{LeadCreateDBRequest, LeadFilter, LeadUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::notifications::Notification;
use crate::types::{AgentId, CategoryId, LeadId, Operation, OrganisationId, Resource, abbrev_uuid};

const LEAD_CREATED_SUBJECT: &str = "A lead has been created";
const LEAD_CREATED_BODY: &str = "Go to the website to see the new lead";

impl AccessEngine {
    /// The leads the actor can see. Organisors also get the unassigned leads of
    /// their organisation alongside, for triage.
    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&actor.account.id)), err)]
    pub async fn list_leads(&self, actor: &Actor, pagination: &Pagination) -> Result<LeadListResponse> {
        let scope = self.permit(actor, Resource::Leads, Operation::List)?.lead_scope();
        let (skip, limit) = pagination.params();
        let filter = LeadFilter::new(skip, limit);

        let data = self.storage.list_leads(&scope, &filter).await?;
        let total_count = self.storage.count_leads(&scope, &filter).await?;

        let unassigned_leads = if actor.is_organisor() {
            let unassigned = self.storage.list_leads(&scope, &LeadFilter::new(0, limit).unassigned()).await?;
            Some(unassigned.into_iter().map(LeadResponse::from).collect())
        } else {
            None
        };

        Ok(LeadListResponse {
            data: data.into_iter().map(LeadResponse::from).collect(),
            total_count,
            skip,
            limit,
            unassigned_leads,
        })
    }

    /// Leads of the organisation with no agent, for the assignment view
    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&actor.account.id)), err)]
    pub async fn unassigned_leads(&self, actor: &Actor, pagination: &Pagination) -> Result<PaginatedResponse<LeadResponse>> {
        let scope = self.permit(actor, Resource::Leads, Operation::AssignAgent)?.lead_scope();
        let (skip, limit) = pagination.params();
        let filter = LeadFilter::new(skip, limit).unassigned();

        let leads = self.storage.list_leads(&scope, &filter).await?;
        let total_count = self.storage.count_leads(&scope, &filter).await?;

        Ok(PaginatedResponse::new(
            leads.into_iter().map(LeadResponse::from).collect(),
            total_count,
            skip,
            limit,
        ))
    }

    #[instrument(skip_all, fields(lead_id = %abbrev_uuid(&id)), err)]
    pub async fn get_lead(&self, actor: &Actor, id: LeadId) -> Result<LeadResponse> {
        let scope = self.permit_row(actor, Resource::Leads, Operation::Read, id)?.lead_scope();
        let lead = self
            .storage
            .get_lead(&scope, id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Leads, id))?;
        Ok(lead.into())
    }

    /// Create a lead in the actor's organisation and tell operations about it
    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&actor.account.id)), err)]
    pub async fn create_lead(&self, actor: &Actor, request: LeadCreate) -> Result<LeadResponse> {
        let scope = self.permit(actor, Resource::Leads, Operation::Create)?;
        let organisation_id = scope.organisation_id();

        let create = LeadCreateDBRequest {
            first_name: validation::bounded("first name", &request.first_name, validation::NAME_MAX)?,
            last_name: validation::bounded("last name", &request.last_name, validation::NAME_MAX)?,
            age: validation::age(request.age)?,
            description: request.description,
            phone_number: validation::bounded("phone number", &request.phone_number, validation::PHONE_MAX)?,
            email: validation::email(&request.email)?,
            agent_id: request.agent_id,
            category_id: None,
        };
        if let Some(agent_id) = create.agent_id {
            self.require_agent_in(organisation_id, agent_id).await?;
        }

        // The organisation comes from the scope, never from the request
        let lead = self.storage.create_lead(&scope.lead_scope(), &create).await?;
        tracing::info!(lead_id = %abbrev_uuid(&lead.id), organisation_id = %abbrev_uuid(&organisation_id), "Lead created");

        self.notify(Notification::new(
            LEAD_CREATED_SUBJECT,
            LEAD_CREATED_BODY,
            self.notifications.lead_notice_from.clone(),
            self.notifications.operations_addresses.clone(),
        ));

        Ok(lead.into())
    }

    #[instrument(skip_all, fields(lead_id = %abbrev_uuid(&id)), err)]
    pub async fn update_lead(&self, actor: &Actor, id: LeadId, request: LeadUpdate) -> Result<LeadResponse> {
        let scope = self.permit_row(actor, Resource::Leads, Operation::Update, id)?;

        let update = LeadUpdateDBRequest {
            first_name: validation::optional_bounded("first name", request.first_name.as_deref(), validation::NAME_MAX)?,
            last_name: validation::optional_bounded("last name", request.last_name.as_deref(), validation::NAME_MAX)?,
            age: request.age.map(validation::age).transpose()?,
            phone_number: validation::optional_bounded("phone number", request.phone_number.as_deref(), validation::PHONE_MAX)?,
            email: validation::optional_email(request.email.as_deref())?,
            ..LeadUpdateDBRequest::from(request)
        };
        if let Some(Some(agent_id)) = update.agent_id {
            self.require_agent_in(scope.organisation_id(), agent_id).await?;
        }

        let lead = self
            .storage
            .update_lead(&scope.lead_scope(), id, &update)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Leads, id))?;
        Ok(lead.into())
    }

    #[instrument(skip_all, fields(lead_id = %abbrev_uuid(&id)), err)]
    pub async fn delete_lead(&self, actor: &Actor, id: LeadId) -> Result<()> {
        let scope = self.permit_row(actor, Resource::Leads, Operation::Delete, id)?.lead_scope();
        if !self.storage.delete_lead(&scope, id).await? {
            return Err(Error::not_found(Resource::Leads, id));
        }
        Ok(())
    }

    /// Agents a lead may be assigned to: the agents of the actor's organisation
    #[instrument(skip_all, fields(lead_id = %abbrev_uuid(&id)), err)]
    pub async fn assignable_agents(&self, actor: &Actor, id: LeadId) -> Result<Vec<AgentResponse>> {
        let scope = self.permit_row(actor, Resource::Leads, Operation::AssignAgent, id)?;
        if self.storage.get_lead(&scope.lead_scope(), id).await?.is_none() {
            return Err(Error::not_found(Resource::Leads, id));
        }

        let agents = self
            .storage
            .list_agents(scope.organisation_id(), &AgentFilter::new(0, ALL_ROWS))
            .await?;
        Ok(agents.into_iter().map(AgentResponse::from).collect())
    }

    /// Point a lead at an agent of the same organisation
    #[instrument(skip_all, fields(lead_id = %abbrev_uuid(&id), agent_id = %abbrev_uuid(&agent_id)), err)]
    pub async fn assign_agent(&self, actor: &Actor, id: LeadId, agent_id: AgentId) -> Result<LeadResponse> {
        let scope = self.permit_row(actor, Resource::Leads, Operation::AssignAgent, id)?;
        let lead_scope = scope.lead_scope();
        if self.storage.get_lead(&lead_scope, id).await?.is_none() {
            return Err(Error::not_found(Resource::Leads, id));
        }
        self.require_agent_in(scope.organisation_id(), agent_id).await?;

        let update = LeadUpdateDBRequest {
            agent_id: Some(Some(agent_id)),
            ..Default::default()
        };
        let lead = self
            .storage
            .update_lead(&lead_scope, id, &update)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Leads, id))?;
        tracing::info!("Lead assigned");
        Ok(lead.into())
    }

    /// File a visible lead under a category of the organisation, or under none
    #[instrument(skip_all, fields(lead_id = %abbrev_uuid(&id)), err)]
    pub async fn update_lead_category(&self, actor: &Actor, id: LeadId, category_id: Option<CategoryId>) -> Result<LeadResponse> {
        let scope = self.permit_row(actor, Resource::Leads, Operation::Categorise, id)?;
        let lead_scope = scope.lead_scope();
        if self.storage.get_lead(&lead_scope, id).await?.is_none() {
            return Err(Error::not_found(Resource::Leads, id));
        }
        if let Some(category_id) = category_id
            && self.storage.get_category(scope.organisation_id(), category_id).await?.is_none()
        {
            return Err(Error::validation(format!(
                "Category {category_id} does not belong to your organisation"
            )));
        }

        let update = LeadUpdateDBRequest {
            category_id: Some(category_id),
            ..Default::default()
        };
        let lead = self
            .storage
            .update_lead(&lead_scope, id, &update)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Leads, id))?;
        Ok(lead.into())
    }

    /// An agent id from a request must name an agent of this organisation
    async fn require_agent_in(&self, organisation_id: OrganisationId, agent_id: AgentId) -> Result<()> {
        if self.storage.get_agent(organisation_id, agent_id).await?.is_none() {
            return Err(Error::validation(format!("Agent {agent_id} does not belong to your organisation")));
        }
        Ok(())
    }
}
