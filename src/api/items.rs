//! Item availability endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{ItemAvailability, ItemId},
};

/// Get an item with its copy availability
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemAvailability),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    Path(id): Path<ItemId>,
) -> AppResult<Json<ItemAvailability>> {
    let item = state.services.loans.get_item(id).await?;
    Ok(Json(item.into()))
}
