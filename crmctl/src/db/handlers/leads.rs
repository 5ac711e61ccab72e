//! Database repository for leads.
//!
//! The repository is bound to a [`LeadScope`] at construction, and every
//! statement it issues carries that scope's predicate in its WHERE clause.

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::leads::{LeadCategoryFilter, LeadCreateDBRequest, LeadDBResponse, LeadFilter, LeadScope, LeadUpdateDBRequest},
};
use crate::types::{LeadId, abbrev_uuid};
use sqlx::{PgConnection, Postgres, query_builder::QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

pub struct Leads<'c> {
    db: &'c mut PgConnection,
    scope: LeadScope,
}

/// Append the scope predicate. Expects the query to already have a WHERE clause.
fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: &LeadScope) {
    query.push(" AND organisation_id = ");
    query.push_bind(scope.organisation_id);
    if let Some(agent_id) = scope.agent_id {
        query.push(" AND agent_id = ");
        query.push_bind(agent_id);
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &LeadFilter) {
    if filter.unassigned_only {
        query.push(" AND agent_id IS NULL");
    }
    match &filter.category {
        LeadCategoryFilter::Any => {}
        LeadCategoryFilter::Is(category_id) => {
            query.push(" AND category_id = ");
            query.push_bind(*category_id);
        }
        LeadCategoryFilter::Uncategorised => {
            query.push(" AND category_id IS NULL");
        }
        LeadCategoryFilter::Named(name) => {
            query.push(" AND category_id IN (SELECT c.id FROM categories c WHERE c.organisation_id = leads.organisation_id AND c.name = ");
            query.push_bind(name.clone());
            query.push(")");
        }
    }
}

impl<'c> Leads<'c> {
    pub fn new(db: &'c mut PgConnection, scope: LeadScope) -> Self {
        Self { db, scope }
    }

    /// Count leads matching the filter, ignoring pagination
    #[instrument(skip(self, filter), fields(organisation_id = %abbrev_uuid(&self.scope.organisation_id)), err)]
    pub async fn count(&mut self, filter: &LeadFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM leads WHERE 1=1");
        push_scope(&mut query, &self.scope);
        push_filter(&mut query, filter);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Leads<'c> {
    type CreateRequest = LeadCreateDBRequest;
    type UpdateRequest = LeadUpdateDBRequest;
    type Response = LeadDBResponse;
    type Id = LeadId;
    type Filter = LeadFilter;

    #[instrument(skip(self, request), fields(organisation_id = %abbrev_uuid(&self.scope.organisation_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let lead = sqlx::query_as::<_, LeadDBResponse>(
            r#"
            INSERT INTO leads (id, organisation_id, agent_id, category_id, first_name, last_name, age, description, phone_number, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(self.scope.organisation_id)
        .bind(request.agent_id)
        .bind(request.category_id)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.age)
        .bind(&request.description)
        .bind(&request.phone_number)
        .bind(&request.email)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(lead)
    }

    #[instrument(skip(self), fields(lead_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM leads WHERE id = ");
        query.push_bind(id);
        push_scope(&mut query, &self.scope);

        let lead = query.build_query_as::<LeadDBResponse>().fetch_optional(&mut *self.db).await?;
        Ok(lead)
    }

    #[instrument(skip(self, filter), fields(organisation_id = %abbrev_uuid(&self.scope.organisation_id), limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM leads WHERE 1=1");
        push_scope(&mut query, &self.scope);
        push_filter(&mut query, filter);

        query.push(" ORDER BY date_added DESC, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let leads = query.build_query_as::<LeadDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(leads)
    }

    #[instrument(skip(self), fields(lead_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let mut query = QueryBuilder::new("DELETE FROM leads WHERE id = ");
        query.push_bind(id);
        push_scope(&mut query, &self.scope);

        let result = query.build().execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(lead_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::new("UPDATE leads SET first_name = COALESCE(");
        query.push_bind(request.first_name.clone());
        query.push(", first_name), last_name = COALESCE(");
        query.push_bind(request.last_name.clone());
        query.push(", last_name), age = COALESCE(");
        query.push_bind(request.age);
        query.push(", age), description = COALESCE(");
        query.push_bind(request.description.clone());
        query.push(", description), phone_number = COALESCE(");
        query.push_bind(request.phone_number.clone());
        query.push(", phone_number), email = COALESCE(");
        query.push_bind(request.email.clone());
        query.push(", email)");

        // Nullable references are only written when the request says so
        if let Some(agent_id) = request.agent_id {
            query.push(", agent_id = ");
            query.push_bind(agent_id);
        }
        if let Some(category_id) = request.category_id {
            query.push(", category_id = ");
            query.push_bind(category_id);
        }

        query.push(" WHERE id = ");
        query.push_bind(id);
        push_scope(&mut query, &self.scope);
        query.push(" RETURNING *");

        let lead = query.build_query_as::<LeadDBResponse>().fetch_optional(&mut *self.db).await?;
        Ok(lead)
    }
}
