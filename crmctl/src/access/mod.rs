//! The access-scoping engine.
//!
//! Every CRM operation is a method on [`AccessEngine`] that takes the acting
//! [`Actor`]. Before touching storage it asks [`scope::scope`] which rows the
//! actor may see for that `(resource, operation)` pair, and passes the answer
//! to storage so the predicate is part of the statement itself.
//!
//! Denials are reported as [`Error::NotFound`]: an actor cannot tell a row that
//! exists outside its scope from one that does not exist at all.
//!
//! # Modules
//!
//! - [`actor`]: the resolved caller
//! - [`scope`]: the visibility table
//! - [`validation`]: field rules
//! - `accounts`, `agents`, `categories`, `leads`: the operations, grouped by entity

pub mod actor;
pub mod scope;
pub mod validation;

mod accounts;
mod agents;
mod categories;
mod leads;

use std::sync::Arc;

use tokio::sync::OnceCell;
use uuid::Uuid;

pub use actor::{Actor, ActorKind};
pub use scope::{Scope, scope};

use crate::auth::password;
use crate::config::{Config, NotificationsConfig, PasswordConfig};
use crate::db::Storage;
use crate::errors::{Error, Result};
use crate::notifications::{Notification, Notifier};
use crate::types::{Operation, Resource};

/// Rows fetched in one go when a view is not paginated
const ALL_ROWS: i64 = i64::MAX;

#[derive(Clone)]
pub struct AccessEngine {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    notifications: NotificationsConfig,
    passwords: PasswordConfig,
    /// Hash checked against when a login names no account, so both paths run argon2
    dummy_hash: Arc<OnceCell<String>>,
}

impl AccessEngine {
    pub fn new(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        Self {
            storage,
            notifier,
            notifications: config.notifications.clone(),
            passwords: config.auth.native.password.clone(),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Scope for a whole-collection operation, or "not found" if the role may not perform it
    fn permit(&self, actor: &Actor, resource: Resource, operation: Operation) -> Result<Scope> {
        scope(actor, resource, operation).ok_or_else(|| {
            tracing::debug!(role = ?actor.role(), %resource, %operation, "Operation outside actor scope");
            Error::not_found(resource, "")
        })
    }

    /// Scope for a single-row operation, or "not found" naming the row
    fn permit_row(&self, actor: &Actor, resource: Resource, operation: Operation, id: Uuid) -> Result<Scope> {
        scope(actor, resource, operation).ok_or_else(|| {
            tracing::debug!(role = ?actor.role(), %resource, %operation, "Operation outside actor scope");
            Error::not_found(resource, id)
        })
    }

    fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Argon2 is CPU bound, so it runs on the blocking pool
    async fn hash_password(&self, plain: String) -> Result<String> {
        let params = self.passwords.argon2_params();
        tokio::task::spawn_blocking(move || password::hash_password(&plain, params))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password hashing task: {e}"),
            })?
    }

    async fn dummy_hash(&self) -> Result<String> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(password::generate_initial_password()))
            .await
            .cloned()
    }

    async fn verify_password(&self, plain: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })?
    }
}
