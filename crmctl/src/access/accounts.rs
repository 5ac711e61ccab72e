//! Signup, login and actor resolution.

use tracing::instrument;

use super::{AccessEngine, Actor, ActorKind, validation};
use crate::api::models::accounts::{CurrentUser, Role};
use crate::api::models::auth::RegisterRequest;
use crate::config::InitialOrganisorConfig;
use crate::db::models::accounts::{AccountCreateDBRequest, AccountDBResponse};
use crate::errors::{Error, Result};
use crate::types::abbrev_uuid;


impl AccessEngine {
    /// Create an organisor account together with its organisation.
    #[instrument(skip_all, fields(username = %request.username), err)]
    pub async fn register_organisor(&self, request: RegisterRequest) -> Result<AccountDBResponse> {
        if request.requested_role()? != Role::Organisor {
            return Err(Error::validation("Signup creates organisor accounts; agents are added by their organisor"));
        }
        validation::password(&request.password, self.passwords.min_length, self.passwords.max_length)?;
        let username = validation::bounded("username", &request.username, validation::USERNAME_MAX)?;
        let email = validation::email(&request.email)?;
        let first_name = validation::at_most("first name", &request.first_name, validation::ACCOUNT_NAME_MAX)?;
        let last_name = validation::at_most("last name", &request.last_name, validation::ACCOUNT_NAME_MAX)?;

        let password_hash = self.hash_password(request.password).await?;
        let (account, organisation) = self
            .storage
            .create_organisor(&AccountCreateDBRequest {
                username,
                email,
                first_name,
                last_name,
                role: Role::Organisor,
                password_hash,
            })
            .await?;

        tracing::info!(
            account_id = %abbrev_uuid(&account.id),
            organisation_id = %abbrev_uuid(&organisation.id),
            "Registered organisor"
        );
        Ok(account)
    }

    /// Check a username and password. Unknown usernames and wrong passwords fail identically.
    #[instrument(skip_all, fields(username = %username), err)]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AccountDBResponse> {
        let invalid = || Error::Unauthenticated {
            message: Some("Invalid username or password".to_string()),
        };

        let Some(account) = self.storage.get_account_by_username(username.trim()).await? else {
            // Same argon2 cost as a wrong password
            let hash = self.dummy_hash().await?;
            self.verify_password(password.to_string(), hash).await?;
            return Err(invalid());
        };
        if !self.verify_password(password.to_string(), account.password_hash.clone()).await? {
            return Err(invalid());
        }
        Ok(account)
    }

    /// Load the account behind a session and attach its organisation or agent profile.
    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&user.id)), err)]
    pub async fn resolve_actor(&self, user: &CurrentUser) -> Result<Actor> {
        let unauthenticated = || Error::Unauthenticated { message: None };

        let account = self.storage.get_account(user.id).await?.ok_or_else(unauthenticated)?;
        let kind = match account.role {
            Role::Organisor => {
                let organisation = self
                    .storage
                    .get_organisation_by_owner(account.id)
                    .await?
                    .ok_or_else(unauthenticated)?;
                ActorKind::Organisor {
                    organisation_id: organisation.id,
                }
            }
            Role::Agent => {
                let agent = self.storage.get_agent_by_account(account.id).await?.ok_or_else(unauthenticated)?;
                ActorKind::Agent {
                    organisation_id: agent.organisation_id,
                    agent_id: agent.id,
                }
            }
        };

        Ok(Actor { account, kind })
    }

    /// Make sure the configured organisor exists and owns an organisation.
    ///
    /// Safe to run on every startup. An existing account keeps its password.
    #[instrument(skip_all, fields(username = %seed.username), err)]
    pub async fn ensure_organisor(&self, seed: &InitialOrganisorConfig) -> Result<AccountDBResponse> {
        if let Some(account) = self.storage.get_account_by_username(&seed.username).await? {
            if account.role != Role::Organisor {
                return Err(Error::Internal {
                    operation: format!("seed organisor: account {} exists but is not an organisor", seed.username),
                });
            }
            self.storage.ensure_organisation(account.id).await?;
            tracing::debug!("Initial organisor already present");
            return Ok(account);
        }

        self.register_organisor(RegisterRequest {
            username: seed.username.clone(),
            email: seed.email.clone(),
            first_name: String::new(),
            last_name: String::new(),
            password: seed.password.clone(),
            is_organisor: None,
            is_agent: None,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::accounts::{CurrentUser, Role};
    use crate::db::Storage;
    use crate::errors::Error;
    use crate::test_utils::{TestWorld, register_request};

    #[tokio::test]
    async fn signup_creates_one_organisation_and_resolves() {
        let world = TestWorld::new();
        let account = world.engine.register_organisor(register_request("owner")).await.unwrap();

        let actor = world.engine.resolve_actor(&CurrentUser::from(&account)).await.unwrap();
        assert_eq!(actor.role(), Role::Organisor);
        assert_eq!(actor.agent_id(), None);

        let again = world.storage.ensure_organisation(account.id).await.unwrap();
        assert_eq!(again.id, actor.organisation_id());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let world = TestWorld::new();
        world.engine.register_organisor(register_request("owner")).await.unwrap();

        let mut duplicate = register_request("owner");
        duplicate.email = "other@example.com".to_string();
        let err = world.engine.register_organisor(duplicate).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "This username is already taken");
    }

    #[tokio::test]
    async fn signup_validates_fields() {
        let world = TestWorld::new();

        let mut short_password = register_request("owner");
        short_password.password = "short".to_string();
        assert!(matches!(
            world.engine.register_organisor(short_password).await,
            Err(Error::ValidationFailed { .. })
        ));

        let mut bad_email = register_request("owner");
        bad_email.email = "owner-at-example".to_string();
        assert!(matches!(
            world.engine.register_organisor(bad_email).await,
            Err(Error::ValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_password() {
        let world = TestWorld::new();
        world.engine.register_organisor(register_request("owner")).await.unwrap();

        assert!(world.engine.authenticate("owner", "password123").await.is_ok());
        let wrong = world.engine.authenticate("owner", "password124").await.unwrap_err();
        let unknown = world.engine.authenticate("nobody", "password123").await.unwrap_err();
        assert_eq!(wrong.user_message(), unknown.user_message());
        assert!(matches!(wrong, Error::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn unknown_username_still_verifies_a_hash() {
        let world = TestWorld::new();
        assert!(world.engine.dummy_hash.get().is_none());

        let err = world.engine.authenticate("nobody", "password123").await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated { .. }));

        let hash = world.engine.dummy_hash.get().cloned().unwrap();
        assert!(hash.starts_with("$argon2"));
        world.engine.authenticate("nobody", "password123").await.unwrap_err();
        assert_eq!(world.engine.dummy_hash.get(), Some(&hash));
    }

    #[tokio::test]
    async fn resolving_a_deleted_account_is_unauthenticated() {
        let world = TestWorld::new();
        let account = world.engine.register_organisor(register_request("owner")).await.unwrap();
        let user = CurrentUser::from(&account);

        assert!(world.storage.delete_account(account.id).await);
        assert!(matches!(
            world.engine.resolve_actor(&user).await,
            Err(Error::Unauthenticated { .. })
        ));
    }

    #[tokio::test]
    async fn ensure_organisor_is_idempotent() {
        let world = TestWorld::new();
        let seed = crate::config::InitialOrganisorConfig {
            username: "seeded".to_string(),
            email: "seeded@example.com".to_string(),
            password: "password123".to_string(),
        };

        let first = world.engine.ensure_organisor(&seed).await.unwrap();
        let second = world.engine.ensure_organisor(&seed).await.unwrap();
        assert_eq!(first.id, second.id);
    }
}
