//! OpenAPI documentation.
//!
//! [`ApiDoc`] covers the authentication routes at `/authentication/*` and
//! nests [`CrmApiDoc`], the scoped CRM API, under `/api/v1`.

use utoipa::{
    Modify, OpenApi,
    openapi::{
        Components,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};

use crate::api;

/// Session token as a bearer token or as the session cookie.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Components::default);
        components.security_schemes.insert(
            "BearerAuth".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Session token, as issued by `/authentication/login`:\n\n\
                        ```\nAuthorization: Bearer SESSION_TOKEN\n```",
                    ))
                    .build(),
            ),
        );
        components.security_schemes.insert(
            "CookieAuth".to_string(),
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "crmctl_session",
                "Session cookie set by `/authentication/login` and `/authentication/register`",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::me::get_me,
        api::handlers::leads::list_leads,
        api::handlers::leads::list_unassigned_leads,
        api::handlers::leads::create_lead,
        api::handlers::leads::get_lead,
        api::handlers::leads::update_lead,
        api::handlers::leads::delete_lead,
        api::handlers::leads::list_assignable_agents,
        api::handlers::leads::assign_agent,
        api::handlers::leads::update_lead_category,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::get_category,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
        api::handlers::agents::list_agents,
        api::handlers::agents::create_agent,
        api::handlers::agents::get_agent,
        api::handlers::agents::update_agent,
        api::handlers::agents::delete_agent,
    ),
    components(schemas(
        api::models::accounts::Role,
        api::models::accounts::AccountResponse,
        api::models::accounts::MeResponse,
        api::models::leads::LeadCreate,
        api::models::leads::LeadUpdate,
        api::models::leads::LeadAgentAssignment,
        api::models::leads::LeadCategoryUpdate,
        api::models::leads::LeadResponse,
        api::models::leads::LeadListResponse,
        api::models::categories::CategoryCreate,
        api::models::categories::CategoryUpdate,
        api::models::categories::CategoryResponse,
        api::models::categories::CategoryDashboardResponse,
        api::models::categories::CategoryDetailResponse,
        api::models::agents::AgentCreate,
        api::models::agents::AgentUpdate,
        api::models::agents::AgentResponse,
    )),
    tags(
        (name = "accounts", description = "The authenticated actor"),
        (name = "leads", description = "Leads, scoped to the caller's organisation or assignments"),
        (name = "categories", description = "Lead categories and dashboard counts"),
        (name = "agents", description = "Agent accounts of an organisation"),
    )
)]
pub struct CrmApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "crmctl",
        description = "Organisation-scoped CRM: organisors manage leads, categories and agents; agents work the leads assigned to them."
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
    ),
    components(schemas(
        api::models::auth::RegisterRequest,
        api::models::auth::LoginRequest,
        api::models::auth::AuthResponse,
        api::models::auth::AuthSuccessResponse,
    )),
    nest(
        (path = "/api/v1", api = CrmApiDoc)
    ),
    tags(
        (name = "authentication", description = "Signup, login and logout"),
    )
)]
pub struct ApiDoc;
