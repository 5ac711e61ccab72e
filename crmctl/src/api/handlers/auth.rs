use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        accounts::{AccountResponse, CurrentUser},
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, RegisterRequest, RegisterResponse},
    },
    auth::session,
    db::models::accounts::AccountDBResponse,
    errors::{Error, Result},
};

fn require_native_auth(state: &AppState) -> Result<()> {
    if !state.config.auth.native.enabled {
        return Err(Error::validation("Native authentication is disabled"));
    }
    Ok(())
}

/// Issue a session for `account` and wrap it with the response body
fn start_session(state: &AppState, account: AccountDBResponse, message: &str) -> Result<(AuthResponse, String)> {
    let token = session::create_session_token(&CurrentUser::from(&account), &state.config)?;
    let cookie = session::session_cookie(&token, &state.config);
    let body = AuthResponse {
        account: AccountResponse::from(account),
        message: message.to_string(),
    };
    Ok((body, cookie))
}

/// Sign up as an organisor. Creates the account and its organisation, then logs in.
#[utoipa::path(
    post,
    path = "/authentication/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "Organisor registered", body = AuthResponse),
        (status = 400, description = "Invalid request or registration disabled"),
        (status = 409, description = "Username or email already in use"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse> {
    require_native_auth(&state)?;
    if !state.config.auth.native.allow_registration {
        return Err(Error::validation("User registration is disabled"));
    }

    let account = state.engine.register_organisor(request).await?;
    let (body, cookie) = start_session(&state, account, "Registration successful")?;

    Ok(RegisterResponse {
        status: StatusCode::CREATED,
        body,
        cookie,
    })
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse> {
    require_native_auth(&state)?;

    let account = state.engine.authenticate(&request.username, &request.password).await?;
    let (body, cookie) = start_session(&state, account, "Login successful")?;

    Ok(LoginResponse {
        status: StatusCode::OK,
        body,
        cookie,
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse> {
    Ok(LogoutResponse {
        status: StatusCode::OK,
        body: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie: session::clear_session_cookie(&state.config),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::models::auth::AuthResponse;
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::json;

    fn register_body(username: &str) -> serde_json::Value {
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "password123",
        })
    }

    #[tokio::test]
    async fn register_sets_session_cookie() {
        let server = create_test_app().await;

        let response = server.post("/authentication/register").json(&register_body("owner")).await;
        response.assert_status(StatusCode::CREATED);

        let cookie = response.header("set-cookie");
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("crmctl_session="));
        assert!(cookie.contains("HttpOnly"));

        let body: AuthResponse = response.json();
        assert_eq!(body.account.username, "owner");
        assert!(body.account.is_organisor);
        assert!(!body.account.is_agent);
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let server = create_test_app().await;
        server.post("/authentication/register").json(&register_body("owner")).await;

        let response = server
            .post("/authentication/register")
            .json(&json!({ "username": "owner", "email": "other@example.com", "password": "password123" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn register_accepts_only_organisor_role_flags() {
        let server = create_test_app().await;

        for (is_organisor, is_agent) in [(true, true), (false, false), (false, true)] {
            let mut body = register_body("owner");
            body["is_organisor"] = json!(is_organisor);
            body["is_agent"] = json!(is_agent);
            let response = server.post("/authentication/register").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }

        let mut body = register_body("owner");
        body["is_organisor"] = json!(true);
        body["is_agent"] = json!(false);
        let response = server.post("/authentication/register").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        let body: AuthResponse = response.json();
        assert!(body.account.is_organisor);
    }

    #[tokio::test]
    async fn login_checks_credentials() {
        let server = create_test_app().await;
        server.post("/authentication/register").json(&register_body("owner")).await;

        let response = server
            .post("/authentication/login")
            .json(&json!({ "username": "owner", "password": "password123" }))
            .await;
        response.assert_status_ok();
        assert!(response.header("set-cookie").to_str().unwrap().starts_with("crmctl_session="));

        let response = server
            .post("/authentication/login")
            .json(&json!({ "username": "owner", "password": "wrong-password" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_expires_cookie() {
        let server = create_test_app().await;

        let response = server.post("/authentication/logout").await;
        response.assert_status_ok();
        let cookie = response.header("set-cookie");
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
    }
}
