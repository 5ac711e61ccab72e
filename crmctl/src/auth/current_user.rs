//! Axum extractors for the caller's identity.
//!
//! [`CurrentUser`] only checks the session token. [`Actor`] goes on to load the
//! account and its organisation or agent profile, which is what every scoped
//! handler needs.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    access::Actor,
    api::models::accounts::CurrentUser,
    auth::session,
    config::Config,
    errors::{Error, Result},
};

/// Session token from the session cookie.
///
/// - `None`: no session cookie
/// - `Some(Ok(user))`: cookie holds a valid token
/// - `Some(Err(_))`: cookie present but unusable
#[instrument(skip_all)]
fn try_session_cookie(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(header::COOKIE)?;
    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::validation(format!("Invalid cookie header: {e}"))));
        }
    };
    let cookie_name = &config.auth.native.session.cookie_name;

    let token = cookie_str
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find_map(|(name, value)| (name == cookie_name).then_some(value))?;
    Some(session::verify_session_token(token, config))
}

/// Session token from an `Authorization: Bearer` header, for non-browser clients.
#[instrument(skip_all)]
fn try_bearer_token(parts: &Parts, config: &Config) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(header::AUTHORIZATION)?;
    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::validation(format!("Invalid authorization header: {e}"))));
        }
    };
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(session::verify_session_token(token.trim(), config))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if !state.config.auth.native.enabled {
            return Err(Error::Unauthenticated { message: None });
        }

        // The first method that yields a valid token wins
        let mut any_auth_attempted = false;
        for (method, attempt) in [
            ("bearer token", try_bearer_token(parts, &state.config)),
            ("session cookie", try_session_cookie(parts, &state.config)),
        ] {
            match attempt {
                Some(Ok(user)) => {
                    debug!("Authenticated account {} via {method}", user.id);
                    return Ok(user);
                }
                Some(Err(e)) => {
                    trace!("Authentication via {method} failed: {:?}", e);
                    any_auth_attempted = true;
                }
                None => trace!("No {method} present"),
            }
        }

        if !any_auth_attempted {
            trace!("No authentication credentials found in request");
        }
        Err(Error::Unauthenticated { message: None })
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        state.engine.resolve_actor(&user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::accounts::Role;
    use crate::test_utils::{TestWorld, register_request};
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_with_header(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _body) = Request::builder()
            .uri("http://localhost/api/v1/me")
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn token_for(world: &TestWorld, user: &CurrentUser) -> String {
        session::create_session_token(user, &world.config).unwrap()
    }

    #[tokio::test]
    async fn cookie_and_bearer_both_authenticate() {
        let world = TestWorld::new();
        let state = world.app_state();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "owner".to_string(),
            role: Role::Organisor,
        };
        let token = token_for(&world, &user);

        let mut parts = parts_with_header(header::COOKIE, &format!("theme=dark; crmctl_session={token}"));
        assert_eq!(CurrentUser::from_request_parts(&mut parts, &state).await.unwrap(), user);

        let mut parts = parts_with_header(header::AUTHORIZATION, &format!("Bearer {token}"));
        assert_eq!(CurrentUser::from_request_parts(&mut parts, &state).await.unwrap(), user);
    }

    #[tokio::test]
    async fn missing_or_bad_credentials_are_unauthenticated() {
        let world = TestWorld::new();
        let state = world.app_state();

        let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
        assert!(matches!(
            CurrentUser::from_request_parts(&mut parts, &state).await,
            Err(Error::Unauthenticated { .. })
        ));

        let mut parts = parts_with_header(header::COOKIE, "crmctl_session=garbage");
        assert!(matches!(
            CurrentUser::from_request_parts(&mut parts, &state).await,
            Err(Error::Unauthenticated { .. })
        ));
    }

    #[tokio::test]
    async fn actor_requires_a_live_account() {
        let world = TestWorld::new();
        let state = world.app_state();
        let account = world.engine.register_organisor(register_request("owner")).await.unwrap();
        let token = token_for(&world, &CurrentUser::from(&account));

        let mut parts = parts_with_header(header::AUTHORIZATION, &format!("Bearer {token}"));
        let actor = Actor::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(actor.is_organisor());

        // A valid token for an account that no longer exists
        world.storage.delete_account(account.id).await;
        let mut parts = parts_with_header(header::AUTHORIZATION, &format!("Bearer {token}"));
        assert!(matches!(
            Actor::from_request_parts(&mut parts, &state).await,
            Err(Error::Unauthenticated { .. })
        ));
    }
}
