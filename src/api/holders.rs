//! Holder endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{Holder, HolderId},
};

/// Get a holder with the items currently on loan
#[utoipa::path(
    get,
    path = "/holders/{id}",
    tag = "holders",
    params(
        ("id" = i32, Path, description = "Holder ID")
    ),
    responses(
        (status = 200, description = "Holder details", body = Holder),
        (status = 404, description = "Holder not found")
    )
)]
pub async fn get_holder(
    State(state): State<crate::AppState>,
    Path(id): Path<HolderId>,
) -> AppResult<Json<Holder>> {
    let holder = state.services.loans.get_holder(id).await?;
    Ok(Json(holder))
}

/// Delete a holder with no pending loans
#[utoipa::path(
    delete,
    path = "/holders/{id}",
    tag = "holders",
    params(
        ("id" = i32, Path, description = "Holder ID")
    ),
    responses(
        (status = 200, description = "Holder deleted", body = Holder),
        (status = 404, description = "Holder not found"),
        (status = 409, description = "Holder still has items to return")
    )
)]
pub async fn delete_holder(
    State(state): State<crate::AppState>,
    Path(id): Path<HolderId>,
) -> AppResult<Json<Holder>> {
    let holder = state.services.loans.delete_holder(id).await?;
    Ok(Json(holder))
}
