use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::entities::marketplace_item;
use crate::error::AppError;
use crate::routes::Envelope;
use crate::{store, AppState};

pub const NO_ITEMS_MESSAGE: &str = "No marketplace items found";

/// List every catalog entry
#[utoipa::path(
    get,
    path = "/api/marketplace",
    responses(
        (status = 200, description = "All catalog entries; an empty catalog carries a `message` instead", body = Vec<marketplace_item::Model>),
        (status = 500, description = "Database unavailable or query failed")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_marketplace(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = state.db.connect().await?;
    let items = store::list_marketplace(conn).await?;

    if items.is_empty() {
        tracing::info!("Marketplace catalog is empty");
        return Ok(Json(Envelope::new(items).with_message(NO_ITEMS_MESSAGE).with_count(0)));
    }

    let count = items.len();
    Ok(Json(Envelope::new(items).with_count(count)))
}

/// Fetch a single catalog entry
#[utoipa::path(
    get,
    path = "/api/marketplace/{id}",
    params(("id" = i32, Path, description = "Catalog entry id")),
    responses(
        (status = 200, description = "Catalog entry", body = marketplace_item::Model),
        (status = 404, description = "No such entry"),
        (status = 500, description = "Database unavailable or query failed")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_marketplace_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = state.db.connect().await?;
    let item = store::find_marketplace_item(conn, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("marketplace item {}", id)))?;

    Ok(Json(Envelope::new(item)))
}
