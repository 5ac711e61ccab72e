use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    access::Actor,
    api::models::{
        categories::{CategoryCreate, CategoryDashboardResponse, CategoryDetailResponse, CategoryResponse, CategoryUpdate},
        pagination::Pagination,
    },
    errors::Result,
    types::CategoryId,
};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    summary = "List categories with lead counts",
    description = "Counts only include leads the caller can see.",
    responses(
        (status = 200, description = "Categories and lead counts", body = CategoryDashboardResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    params(Pagination),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    actor: Actor,
) -> Result<Json<CategoryDashboardResponse>> {
    Ok(Json(state.engine.category_dashboard(&actor, &pagination).await?))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    summary = "Create category",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not available to this account"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let category = state.engine.create_category(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/categories/{category_id}",
    tag = "categories",
    summary = "Get category with its leads",
    responses(
        (status = 200, description = "Category and the visible leads in it", body = CategoryDetailResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
    ),
    params(
        ("category_id" = uuid::Uuid, Path, description = "Category ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
    actor: Actor,
) -> Result<Json<CategoryDetailResponse>> {
    Ok(Json(state.engine.get_category(&actor, category_id).await?))
}

#[utoipa::path(
    patch,
    path = "/categories/{category_id}",
    tag = "categories",
    summary = "Rename category",
    request_body = CategoryUpdate,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
    ),
    params(
        ("category_id" = uuid::Uuid, Path, description = "Category ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
    actor: Actor,
    Json(request): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>> {
    Ok(Json(state.engine.update_category(&actor, category_id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/categories/{category_id}",
    tag = "categories",
    summary = "Delete category",
    description = "Leads in the category are kept and become uncategorised.",
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
    ),
    params(
        ("category_id" = uuid::Uuid, Path, description = "Category ID")
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
    actor: Actor,
) -> Result<StatusCode> {
    state.engine.delete_category(&actor, category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
