//! Database repository for lead categories, scoped to one organisation.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryFilter, CategoryUpdateDBRequest},
};
use crate::types::{CategoryId, OrganisationId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Categories<'c> {
    db: &'c mut PgConnection,
    organisation_id: OrganisationId,
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut PgConnection, organisation_id: OrganisationId) -> Self {
        Self { db, organisation_id }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type UpdateRequest = CategoryUpdateDBRequest;
    type Response = CategoryDBResponse;
    type Id = CategoryId;
    type Filter = CategoryFilter;

    #[instrument(skip(self, request), fields(organisation_id = %abbrev_uuid(&self.organisation_id), name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, CategoryDBResponse>(
            "INSERT INTO categories (id, organisation_id, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(self.organisation_id)
        .bind(&request.name)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(category)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, CategoryDBResponse>("SELECT * FROM categories WHERE id = $1 AND organisation_id = $2")
            .bind(id)
            .bind(self.organisation_id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(category)
    }

    #[instrument(skip(self, filter), fields(organisation_id = %abbrev_uuid(&self.organisation_id), limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let categories = sqlx::query_as::<_, CategoryDBResponse>(
            "SELECT * FROM categories WHERE organisation_id = $1 ORDER BY name, id LIMIT $2 OFFSET $3",
        )
        .bind(self.organisation_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(categories)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND organisation_id = $2")
            .bind(id)
            .bind(self.organisation_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, CategoryDBResponse>(
            "UPDATE categories SET name = COALESCE($3, name) WHERE id = $1 AND organisation_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(self.organisation_id)
        .bind(&request.name)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(category)
    }
}
