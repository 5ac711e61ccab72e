use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    access::Actor,
    api::models::{
        agents::AgentResponse,
        leads::{LeadAgentAssignment, LeadCategoryUpdate, LeadCreate, LeadListResponse, LeadResponse, LeadUpdate, ListLeadsQuery},
        pagination::{PaginatedResponse, Pagination},
    },
    errors::Result,
    types::LeadId,
};

#[utoipa::path(
    get,
    path = "/leads",
    tag = "leads",
    summary = "List leads",
    description = "Organisors see every lead of their organisation plus the ones nobody is working on. Agents see the leads assigned to them.",
    responses(
        (status = 200, description = "Visible leads", body = LeadListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    params(ListLeadsQuery),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_leads(
    State(state): State<AppState>,
    Query(query): Query<ListLeadsQuery>,
    actor: Actor,
) -> Result<Json<LeadListResponse>> {
    Ok(Json(state.engine.list_leads(&actor, &query.pagination).await?))
}

#[utoipa::path(
    get,
    path = "/leads/unassigned",
    tag = "leads",
    summary = "List unassigned leads",
    responses(
        (status = 200, description = "Leads with no agent", body = PaginatedResponse<LeadResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not available to this account"),
    ),
    params(Pagination),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_unassigned_leads(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    actor: Actor,
) -> Result<Json<PaginatedResponse<LeadResponse>>> {
    Ok(Json(state.engine.unassigned_leads(&actor, &pagination).await?))
}

#[utoipa::path(
    post,
    path = "/leads",
    tag = "leads",
    summary = "Create lead",
    request_body = LeadCreate,
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not available to this account"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_lead(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<LeadCreate>,
) -> Result<(StatusCode, Json<LeadResponse>)> {
    let lead = state.engine.create_lead(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

#[utoipa::path(
    get,
    path = "/leads/{lead_id}",
    tag = "leads",
    summary = "Get lead",
    responses(
        (status = 200, description = "Lead", body = LeadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    ),
    params(
        ("lead_id" = uuid::Uuid, Path, description = "Lead ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_lead(State(state): State<AppState>, Path(lead_id): Path<LeadId>, actor: Actor) -> Result<Json<LeadResponse>> {
    Ok(Json(state.engine.get_lead(&actor, lead_id).await?))
}

#[utoipa::path(
    patch,
    path = "/leads/{lead_id}",
    tag = "leads",
    summary = "Update lead",
    request_body = LeadUpdate,
    responses(
        (status = 200, description = "Lead updated", body = LeadResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    ),
    params(
        ("lead_id" = uuid::Uuid, Path, description = "Lead ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<LeadId>,
    actor: Actor,
    Json(request): Json<LeadUpdate>,
) -> Result<Json<LeadResponse>> {
    Ok(Json(state.engine.update_lead(&actor, lead_id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/leads/{lead_id}",
    tag = "leads",
    summary = "Delete lead",
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    ),
    params(
        ("lead_id" = uuid::Uuid, Path, description = "Lead ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_lead(State(state): State<AppState>, Path(lead_id): Path<LeadId>, actor: Actor) -> Result<StatusCode> {
    state.engine.delete_lead(&actor, lead_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/leads/{lead_id}/assignable-agents",
    tag = "leads",
    summary = "List agents a lead can be assigned to",
    responses(
        (status = 200, description = "Agents of the lead's organisation", body = Vec<AgentResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    ),
    params(
        ("lead_id" = uuid::Uuid, Path, description = "Lead ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_assignable_agents(
    State(state): State<AppState>,
    Path(lead_id): Path<LeadId>,
    actor: Actor,
) -> Result<Json<Vec<AgentResponse>>> {
    Ok(Json(state.engine.assignable_agents(&actor, lead_id).await?))
}

#[utoipa::path(
    put,
    path = "/leads/{lead_id}/agent",
    tag = "leads",
    summary = "Assign lead to agent",
    request_body = LeadAgentAssignment,
    responses(
        (status = 200, description = "Lead assigned", body = LeadResponse),
        (status = 400, description = "Agent is not part of the organisation"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    ),
    params(
        ("lead_id" = uuid::Uuid, Path, description = "Lead ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn assign_agent(
    State(state): State<AppState>,
    Path(lead_id): Path<LeadId>,
    actor: Actor,
    Json(request): Json<LeadAgentAssignment>,
) -> Result<Json<LeadResponse>> {
    Ok(Json(state.engine.assign_agent(&actor, lead_id, request.agent_id).await?))
}

#[utoipa::path(
    put,
    path = "/leads/{lead_id}/category",
    tag = "leads",
    summary = "Set lead category",
    request_body = LeadCategoryUpdate,
    responses(
        (status = 200, description = "Category updated", body = LeadResponse),
        (status = 400, description = "Category is not part of the organisation"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    ),
    params(
        ("lead_id" = uuid::Uuid, Path, description = "Lead ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_lead_category(
    State(state): State<AppState>,
    Path(lead_id): Path<LeadId>,
    actor: Actor,
    Json(request): Json<LeadCategoryUpdate>,
) -> Result<Json<LeadResponse>> {
    Ok(Json(state.engine.update_lead_category(&actor, lead_id, request.category_id).await?))
}
