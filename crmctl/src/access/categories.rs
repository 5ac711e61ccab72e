//! Category operations and the category dashboard.

use tracing::instrument;

use super::{ALL_ROWS, AccessEngine, Actor, validation};
use crate::api::models::categories::{
    CategoryCreate, CategoryDashboardResponse, CategoryDetailResponse, CategoryResponse, CategoryUpdate,
};
use crate::api::models::leads::LeadResponse;
use crate::api::models::pagination::Pagination;
use crate::db::models::categories::{CategoryCreateDBRequest, CategoryFilter, CategoryUpdateDBRequest};
use crate::db::models::leads::{LeadCategoryFilter, LeadFilter, LeadScope};
use crate::errors::{Error, Result};
use crate::types::{CategoryId, Operation, Resource, abbrev_uuid};

/// Category names the dashboard reports counts for
const CONTACTED: &str = "Contacted";
const CONVERTED: &str = "Converted";

impl AccessEngine {
    /// Categories of the organisation, with lead counts taken over the leads the actor can see
    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&actor.account.id)), err)]
    pub async fn category_dashboard(&self, actor: &Actor, pagination: &Pagination) -> Result<CategoryDashboardResponse> {
        let scope = self.permit(actor, Resource::Categories, Operation::List)?;
        let leads = self.permit(actor, Resource::Leads, Operation::List)?.lead_scope();
        let (skip, limit) = pagination.params();

        let categories = self
            .storage
            .list_categories(scope.organisation_id(), &CategoryFilter::new(skip, limit))
            .await?;

        let unassigned_lead_count = self.count_leads_in(&leads, LeadCategoryFilter::Uncategorised).await?;
        let contacted_lead_count = self
            .count_leads_in(&leads, LeadCategoryFilter::Named(CONTACTED.to_string()))
            .await?;
        let converted_lead_count = self
            .count_leads_in(&leads, LeadCategoryFilter::Named(CONVERTED.to_string()))
            .await?;

        Ok(CategoryDashboardResponse {
            categories: categories.into_iter().map(CategoryResponse::from).collect(),
            unassigned_lead_count,
            contacted_lead_count,
            converted_lead_count,
        })
    }

    /// One category and the leads in it that the actor can see
    #[instrument(skip_all, fields(category_id = %abbrev_uuid(&id)), err)]
    pub async fn get_category(&self, actor: &Actor, id: CategoryId) -> Result<CategoryDetailResponse> {
        let scope = self.permit_row(actor, Resource::Categories, Operation::Read, id)?;
        let category = self
            .storage
            .get_category(scope.organisation_id(), id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Categories, id))?;

        let leads = self.permit(actor, Resource::Leads, Operation::List)?.lead_scope();
        let filter = LeadFilter::new(0, ALL_ROWS).in_category(LeadCategoryFilter::Is(id));
        let leads = self.storage.list_leads(&leads, &filter).await?;

        Ok(CategoryDetailResponse {
            category: category.into(),
            leads: leads.into_iter().map(LeadResponse::from).collect(),
        })
    }

    #[instrument(skip_all, fields(account_id = %abbrev_uuid(&actor.account.id)), err)]
    pub async fn create_category(&self, actor: &Actor, request: CategoryCreate) -> Result<CategoryResponse> {
        let scope = self.permit(actor, Resource::Categories, Operation::Create)?;
        let name = validation::bounded("category name", &request.name, validation::CATEGORY_NAME_MAX)?;

        let category = self
            .storage
            .create_category(scope.organisation_id(), &CategoryCreateDBRequest { name })
            .await?;
        Ok(category.into())
    }

    #[instrument(skip_all, fields(category_id = %abbrev_uuid(&id)), err)]
    pub async fn update_category(&self, actor: &Actor, id: CategoryId, request: CategoryUpdate) -> Result<CategoryResponse> {
        let scope = self.permit_row(actor, Resource::Categories, Operation::Update, id)?;
        let name = validation::optional_bounded("category name", request.name.as_deref(), validation::CATEGORY_NAME_MAX)?;

        let category = self
            .storage
            .update_category(scope.organisation_id(), id, &CategoryUpdateDBRequest { name })
            .await?
            .ok_or_else(|| Error::not_found(Resource::Categories, id))?;
        Ok(category.into())
    }

    /// Delete a category. Its leads stay, uncategorised.
    #[instrument(skip_all, fields(category_id = %abbrev_uuid(&id)), err)]
    pub async fn delete_category(&self, actor: &Actor, id: CategoryId) -> Result<()> {
        let scope = self.permit_row(actor, Resource::Categories, Operation::Delete, id)?;
        if !self.storage.delete_category(scope.organisation_id(), id).await? {
            return Err(Error::not_found(Resource::Categories, id));
        }
        Ok(())
    }

    async fn count_leads_in(&self, scope: &LeadScope, category: LeadCategoryFilter) -> Result<i64> {
        let filter = LeadFilter::new(0, ALL_ROWS).in_category(category);
        Ok(self.storage.count_leads(scope, &filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::categories::{CategoryCreate, CategoryUpdate};
    use crate::api::models::pagination::Pagination;
    use crate::errors::Error;
    use crate::test_utils::{TestWorld, lead_request};

    fn named(name: &str) -> CategoryCreate {
        CategoryCreate { name: name.to_string() }
    }

    #[tokio::test]
    async fn dashboard_counts_follow_lead_visibility() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;
        let agent = world.agent(&acme, "a1").await;
        let contacted = world.engine.create_category(&acme, named("Contacted")).await.unwrap();
        let converted = world.engine.create_category(&acme, named("Converted")).await.unwrap();

        let mine = world.engine.create_lead(&acme, lead_request("Mine", agent.agent_id())).await.unwrap();
        let other = world.engine.create_lead(&acme, lead_request("Other", None)).await.unwrap();
        let third = world.engine.create_lead(&acme, lead_request("Third", None)).await.unwrap();
        world.engine.update_lead_category(&acme, mine.id, Some(contacted.id)).await.unwrap();
        world.engine.update_lead_category(&acme, other.id, Some(contacted.id)).await.unwrap();
        world.engine.update_lead_category(&acme, third.id, Some(converted.id)).await.unwrap();
        world.engine.create_lead(&acme, lead_request("Loose", None)).await.unwrap();

        let organisor_view = world.engine.category_dashboard(&acme, &Pagination::default()).await.unwrap();
        assert_eq!(organisor_view.categories.len(), 2);
        assert_eq!(organisor_view.unassigned_lead_count, 1);
        assert_eq!(organisor_view.contacted_lead_count, 2);
        assert_eq!(organisor_view.converted_lead_count, 1);

        let agent_view = world.engine.category_dashboard(&agent, &Pagination::default()).await.unwrap();
        assert_eq!(agent_view.categories.len(), 2);
        assert_eq!(agent_view.unassigned_lead_count, 0);
        assert_eq!(agent_view.contacted_lead_count, 1);
        assert_eq!(agent_view.converted_lead_count, 0);
    }

    #[tokio::test]
    async fn category_detail_lists_only_visible_leads() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;
        let agent = world.agent(&acme, "a1").await;
        let contacted = world.engine.create_category(&acme, named("Contacted")).await.unwrap();

        let mine = world.engine.create_lead(&acme, lead_request("Mine", agent.agent_id())).await.unwrap();
        let other = world.engine.create_lead(&acme, lead_request("Other", None)).await.unwrap();
        for lead in [&mine, &other] {
            world.engine.update_lead_category(&acme, lead.id, Some(contacted.id)).await.unwrap();
        }

        assert_eq!(world.engine.get_category(&acme, contacted.id).await.unwrap().leads.len(), 2);
        let as_agent = world.engine.get_category(&agent, contacted.id).await.unwrap();
        assert_eq!(as_agent.leads.iter().map(|l| l.id).collect::<Vec<_>>(), vec![mine.id]);
    }

    #[tokio::test]
    async fn only_organisors_manage_categories() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;
        let agent = world.agent(&acme, "a1").await;
        let category = world.engine.create_category(&acme, named("Contacted")).await.unwrap();

        assert!(matches!(
            world.engine.create_category(&agent, named("Lost")).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            world
                .engine
                .update_category(&agent, category.id, CategoryUpdate { name: Some("x".to_string()) })
                .await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            world.engine.delete_category(&agent, category.id).await,
            Err(Error::NotFound { .. })
        ));

        let renamed = world
            .engine
            .update_category(&acme, category.id, CategoryUpdate { name: Some("Called".to_string()) })
            .await
            .unwrap();
        assert_eq!(renamed.name, "Called");
    }

    #[tokio::test]
    async fn deleting_a_category_keeps_its_leads() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;
        let category = world.engine.create_category(&acme, named("Contacted")).await.unwrap();
        let lead = world.engine.create_lead(&acme, lead_request("Ada", None)).await.unwrap();
        world.engine.update_lead_category(&acme, lead.id, Some(category.id)).await.unwrap();

        world.engine.delete_category(&acme, category.id).await.unwrap();

        let lead = world.engine.get_lead(&acme, lead.id).await.unwrap();
        assert_eq!(lead.category_id, None);
        assert!(matches!(
            world.engine.get_category(&acme, category.id).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn categories_stay_inside_their_organisation() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;
        let globex = world.organisation("globex").await;
        let acme_category = world.engine.create_category(&acme, named("Contacted")).await.unwrap();
        let globex_lead = world.engine.create_lead(&globex, lead_request("Ada", None)).await.unwrap();

        assert!(matches!(
            world.engine.get_category(&globex, acme_category.id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            world
                .engine
                .update_lead_category(&globex, globex_lead.id, Some(acme_category.id))
                .await,
            Err(Error::ValidationFailed { .. })
        ));
        assert!(world.engine.category_dashboard(&globex, &Pagination::default()).await.unwrap().categories.is_empty());
    }

    #[tokio::test]
    async fn agents_recategorise_only_their_own_leads() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;
        let agent = world.agent(&acme, "a1").await;
        let category = world.engine.create_category(&acme, named("Contacted")).await.unwrap();
        let mine = world.engine.create_lead(&acme, lead_request("Mine", agent.agent_id())).await.unwrap();
        let other = world.engine.create_lead(&acme, lead_request("Other", None)).await.unwrap();

        let updated = world.engine.update_lead_category(&agent, mine.id, Some(category.id)).await.unwrap();
        assert_eq!(updated.category_id, Some(category.id));
        let cleared = world.engine.update_lead_category(&agent, mine.id, None).await.unwrap();
        assert_eq!(cleared.category_id, None);

        assert!(matches!(
            world.engine.update_lead_category(&agent, other.id, Some(category.id)).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn category_names_are_bounded() {
        let world = TestWorld::new();
        let acme = world.organisation("acme").await;

        assert!(matches!(
            world.engine.create_category(&acme, named(&"x".repeat(31))).await,
            Err(Error::ValidationFailed { .. })
        ));
        assert!(world.engine.create_category(&acme, named(&"x".repeat(30))).await.is_ok());
    }
}
