//! End-to-end scenarios over HTTP, against in-memory storage.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use crate::api::models::{
    accounts::MeResponse,
    agents::AgentResponse,
    categories::{CategoryDashboardResponse, CategoryResponse},
    leads::{LeadListResponse, LeadResponse},
    pagination::PaginatedResponse,
};
use crate::test_utils::create_test_app;

/// Register an organisor and return its session token
async fn register(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/authentication/register")
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    session_token(response.header("set-cookie").to_str().unwrap())
}

fn session_token(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("crmctl_session="))
        .unwrap()
        .to_string()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn lead_body(first_name: &str, agent_id: Option<&str>) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Lead",
        "age": 41,
        "agent_id": agent_id,
        "phone_number": "555-0100",
        "email": format!("{}@example.com", first_name.to_lowercase()),
    })
}

/// Agents get a generated password, so tests mint their session directly
async fn agent_token(server: &TestServer, organisor: &str, username: &str) -> (AgentResponse, String) {
    let agent: AgentResponse = server
        .post("/api/v1/agents")
        .add_header("authorization", bearer(organisor))
        .json(&json!({ "username": username, "email": format!("{username}@example.com") }))
        .await
        .json();

    let config = crate::test_utils::create_test_config();
    let user = crate::api::models::accounts::CurrentUser {
        id: agent.account_id,
        username: agent.username.clone(),
        role: crate::api::models::accounts::Role::Agent,
    };
    let token = crate::auth::session::create_session_token(&user, &config).unwrap();
    (agent, token)
}

#[test_log::test(tokio::test)]
async fn test_acme_lead_visibility_over_http() {
    let server = create_test_app().await;
    let owner = register(&server, "u1").await;
    let (a1, a1_token) = agent_token(&server, &owner, "a1").await;

    let l1: LeadResponse = server
        .post("/api/v1/leads")
        .add_header("authorization", bearer(&owner))
        .json(&lead_body("L1", Some(&a1.id.to_string())))
        .await
        .json();
    let l2: LeadResponse = server
        .post("/api/v1/leads")
        .add_header("authorization", bearer(&owner))
        .json(&lead_body("L2", None))
        .await
        .json();

    let as_owner: LeadListResponse = server.get("/api/v1/leads").add_header("authorization", bearer(&owner)).await.json();
    let mut ids: Vec<_> = as_owner.data.iter().map(|l| l.id).collect();
    ids.sort();
    let mut expected = vec![l1.id, l2.id];
    expected.sort();
    assert_eq!(ids, expected);
    let unassigned: Vec<_> = as_owner.unassigned_leads.unwrap().iter().map(|l| l.id).collect();
    assert_eq!(unassigned, vec![l2.id]);

    let as_agent: LeadListResponse = server.get("/api/v1/leads").add_header("authorization", bearer(&a1_token)).await.json();
    assert_eq!(as_agent.data.iter().map(|l| l.id).collect::<Vec<_>>(), vec![l1.id]);
    assert!(as_agent.unassigned_leads.is_none());

    let unassigned: PaginatedResponse<LeadResponse> = server
        .get("/api/v1/leads/unassigned")
        .add_header("authorization", bearer(&owner))
        .await
        .json();
    assert_eq!(unassigned.total_count, 1);

    server
        .get(&format!("/api/v1/leads/{}", l2.id))
        .add_header("authorization", bearer(&a1_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_session_cookie_authenticates_me() {
    let server = create_test_app().await;
    let token = register(&server, "owner").await;

    let me: MeResponse = server
        .get("/api/v1/me")
        .add_header("cookie", format!("crmctl_session={token}"))
        .await
        .json();
    assert_eq!(me.account.username, "owner");
    assert!(me.agent_id.is_none());
}

#[test_log::test(tokio::test)]
async fn test_api_requires_authentication() {
    let server = create_test_app().await;

    for path in ["/api/v1/me", "/api/v1/leads", "/api/v1/categories", "/api/v1/agents"] {
        server.get(path).await.assert_status(StatusCode::UNAUTHORIZED);
    }
    server
        .get("/api/v1/leads")
        .add_header("authorization", "Bearer not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_agents_are_refused_organisor_routes() {
    let server = create_test_app().await;
    let owner = register(&server, "owner").await;
    let (_, agent) = agent_token(&server, &owner, "a1").await;

    server
        .get("/api/v1/agents")
        .add_header("authorization", bearer(&agent))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/v1/leads")
        .add_header("authorization", bearer(&agent))
        .json(&lead_body("Sneaky", None))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/api/v1/categories")
        .add_header("authorization", bearer(&agent))
        .json(&json!({ "name": "Lost" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_cross_organisation_assignment_is_rejected() {
    let server = create_test_app().await;
    let acme = register(&server, "acme").await;
    let globex = register(&server, "globex").await;
    let (globex_agent, _) = agent_token(&server, &globex, "g1").await;

    let lead: LeadResponse = server
        .post("/api/v1/leads")
        .add_header("authorization", bearer(&acme))
        .json(&lead_body("Ada", None))
        .await
        .json();

    server
        .put(&format!("/api/v1/leads/{}/agent", lead.id))
        .add_header("authorization", bearer(&acme))
        .json(&json!({ "agent_id": globex_agent.id }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let unchanged: LeadResponse = server
        .get(&format!("/api/v1/leads/{}", lead.id))
        .add_header("authorization", bearer(&acme))
        .await
        .json();
    assert_eq!(unchanged.agent_id, None);

    server
        .get(&format!("/api/v1/leads/{}", lead.id))
        .add_header("authorization", bearer(&globex))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_category_workflow() {
    let server = create_test_app().await;
    let owner = register(&server, "owner").await;

    let response = server
        .post("/api/v1/categories")
        .add_header("authorization", bearer(&owner))
        .json(&json!({ "name": "Contacted" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let contacted: CategoryResponse = response.json();

    let lead: LeadResponse = server
        .post("/api/v1/leads")
        .add_header("authorization", bearer(&owner))
        .json(&lead_body("Ada", None))
        .await
        .json();
    let lead: LeadResponse = server
        .put(&format!("/api/v1/leads/{}/category", lead.id))
        .add_header("authorization", bearer(&owner))
        .json(&json!({ "category_id": contacted.id }))
        .await
        .json();
    assert_eq!(lead.category_id, Some(contacted.id));

    let dashboard: CategoryDashboardResponse = server
        .get("/api/v1/categories")
        .add_header("authorization", bearer(&owner))
        .await
        .json();
    assert_eq!(dashboard.contacted_lead_count, 1);
    assert_eq!(dashboard.unassigned_lead_count, 0);

    server
        .delete(&format!("/api/v1/categories/{}", contacted.id))
        .add_header("authorization", bearer(&owner))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let lead: LeadResponse = server
        .get(&format!("/api/v1/leads/{}", lead.id))
        .add_header("authorization", bearer(&owner))
        .await
        .json();
    assert_eq!(lead.category_id, None);
}

#[test_log::test(tokio::test)]
async fn test_deleting_agent_over_http_unassigns_leads() {
    let server = create_test_app().await;
    let owner = register(&server, "owner").await;
    let (agent, agent_session) = agent_token(&server, &owner, "a1").await;

    for name in ["L1", "L2", "L3"] {
        server
            .post("/api/v1/leads")
            .add_header("authorization", bearer(&owner))
            .json(&lead_body(name, Some(&agent.id.to_string())))
            .await
            .assert_status(StatusCode::CREATED);
    }

    server
        .delete(&format!("/api/v1/agents/{}", agent.id))
        .add_header("authorization", bearer(&owner))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let unassigned: PaginatedResponse<LeadResponse> = server
        .get("/api/v1/leads/unassigned")
        .add_header("authorization", bearer(&owner))
        .await
        .json();
    assert_eq!(unassigned.total_count, 3);

    server
        .get("/api/v1/me")
        .add_header("authorization", bearer(&agent_session))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_health_and_openapi_are_public() {
    let server = create_test_app().await;

    let health = server.get("/healthz").await;
    health.assert_status_ok();
    health.assert_text("OK");

    let doc: Value = server.get("/api-docs/openapi.json").await.json();
    assert!(doc["paths"]["/api/v1/leads"].is_object());
}
