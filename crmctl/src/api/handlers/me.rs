use axum::Json;

use crate::{access::Actor, api::models::accounts::MeResponse, errors::Result};

/// The authenticated account, its role and where it works
#[utoipa::path(
    get,
    path = "/me",
    tag = "accounts",
    summary = "Get current actor",
    responses(
        (status = 200, description = "Current actor", body = MeResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(actor: Actor) -> Result<Json<MeResponse>> {
    Ok(Json(actor.into()))
}
