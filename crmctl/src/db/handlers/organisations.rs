//! Database repository for organisations.
//!
//! An organisation is the profile row of an organisor account. There is no
//! update path, and deletion only happens through the owning account's
//! cascade, so this does not implement [`super::Repository`].

use crate::db::{errors::Result, models::organisations::OrganisationDBResponse};
use crate::types::{AccountId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Organisations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Organisations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert the organisation for `owner`. Fails with a unique violation if it already has one.
    #[instrument(skip(self), fields(owner_id = %abbrev_uuid(&owner)), err)]
    pub async fn create(&mut self, owner: AccountId) -> Result<OrganisationDBResponse> {
        let organisation =
            sqlx::query_as::<_, OrganisationDBResponse>("INSERT INTO organisations (id, owner_id) VALUES ($1, $2) RETURNING *")
                .bind(Uuid::new_v4())
                .bind(owner)
                .fetch_one(&mut *self.db)
                .await?;
        Ok(organisation)
    }

    /// Insert the organisation for `owner` unless it exists, and return whichever row is stored
    #[instrument(skip(self), fields(owner_id = %abbrev_uuid(&owner)), err)]
    pub async fn ensure(&mut self, owner: AccountId) -> Result<OrganisationDBResponse> {
        sqlx::query("INSERT INTO organisations (id, owner_id) VALUES ($1, $2) ON CONFLICT (owner_id) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(owner)
            .execute(&mut *self.db)
            .await?;

        let organisation = sqlx::query_as::<_, OrganisationDBResponse>("SELECT * FROM organisations WHERE owner_id = $1")
            .bind(owner)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(organisation)
    }

    #[instrument(skip(self), fields(owner_id = %abbrev_uuid(&owner)), err)]
    pub async fn get_by_owner(&mut self, owner: AccountId) -> Result<Option<OrganisationDBResponse>> {
        let organisation = sqlx::query_as::<_, OrganisationDBResponse>("SELECT * FROM organisations WHERE owner_id = $1")
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(organisation)
    }
}
