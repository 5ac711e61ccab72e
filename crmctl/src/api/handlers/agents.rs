use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    access::Actor,
    api::models::{
        agents::{AgentCreate, AgentResponse, AgentUpdate},
        pagination::{PaginatedResponse, Pagination},
    },
    errors::Result,
    types::AgentId,
};

#[utoipa::path(
    get,
    path = "/agents",
    tag = "agents",
    summary = "List agents",
    responses(
        (status = 200, description = "Agents of the caller's organisation", body = PaginatedResponse<AgentResponse>),
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
pub async fn list_agents(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    actor: Actor,
) -> Result<Json<PaginatedResponse<AgentResponse>>> {
    Ok(Json(state.engine.list_agents(&actor, &pagination).await?))
}

#[utoipa::path(
    post,
    path = "/agents",
    tag = "agents",
    summary = "Create agent",
    description = "Provisions an agent account with a generated password and emails the agent an invitation.",
    request_body = AgentCreate,
    responses(
        (status = 201, description = "Agent created", body = AgentResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not available to this account"),
        (status = 409, description = "Username or email already in use"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_agent(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<AgentCreate>,
) -> Result<(StatusCode, Json<AgentResponse>)> {
    let agent = state.engine.create_agent(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(agent)))
}

#[utoipa::path(
    get,
    path = "/agents/{agent_id}",
    tag = "agents",
    summary = "Get agent",
    responses(
        (status = 200, description = "Agent", body = AgentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Agent not found"),
    ),
    params(
        ("agent_id" = uuid::Uuid, Path, description = "Agent ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_agent(State(state): State<AppState>, Path(agent_id): Path<AgentId>, actor: Actor) -> Result<Json<AgentResponse>> {
    Ok(Json(state.engine.get_agent(&actor, agent_id).await?))
}

#[utoipa::path(
    patch,
    path = "/agents/{agent_id}",
    tag = "agents",
    summary = "Update agent",
    request_body = AgentUpdate,
    responses(
        (status = 200, description = "Agent updated", body = AgentResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Agent not found"),
    ),
    params(
        ("agent_id" = uuid::Uuid, Path, description = "Agent ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<AgentId>,
    actor: Actor,
    Json(request): Json<AgentUpdate>,
) -> Result<Json<AgentResponse>> {
    Ok(Json(state.engine.update_agent(&actor, agent_id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/agents/{agent_id}",
    tag = "agents",
    summary = "Delete agent",
    description = "Removes the agent and its account. Its leads are kept and become unassigned.",
    responses(
        (status = 204, description = "Agent deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Agent not found"),
    ),
    params(
        ("agent_id" = uuid::Uuid, Path, description = "Agent ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_agent(State(state): State<AppState>, Path(agent_id): Path<AgentId>, actor: Actor) -> Result<StatusCode> {
    state.engine.delete_agent(&actor, agent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
