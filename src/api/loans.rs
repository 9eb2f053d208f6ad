//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        loan::{LoanResponse, ReturnRequest},
        BorrowRequest, HolderId,
    },
};

/// Borrow one copy of each listed item
#[utoipa::path(
    post,
    path = "/holders/{id}/borrow",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Holder ID")
    ),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Items borrowed", body = LoanResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Holder or item not found"),
        (status = 409, description = "Loan limit reached, no copy available or already borrowed")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    Path(holder_id): Path<HolderId>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<Json<LoanResponse>> {
    request.validate()?;

    let holder = state
        .services
        .loans
        .borrow(holder_id, request.item_ids())
        .await?;

    Ok(Json(LoanResponse {
        message: format!("{} item(s) borrowed successfully", request.items.len()),
        holder,
    }))
}

/// Return borrowed items
#[utoipa::path(
    post,
    path = "/holders/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Holder ID")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Items returned", body = LoanResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Holder not found"),
        (status = 422, description = "Item not borrowed by this holder")
    )
)]
pub async fn return_items(
    State(state): State<crate::AppState>,
    Path(holder_id): Path<HolderId>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<LoanResponse>> {
    request.validate()?;

    let holder = state
        .services
        .loans
        .return_items(holder_id, request.item_ids())
        .await?;

    Ok(Json(LoanResponse {
        message: "Items returned successfully".to_string(),
        holder,
    }))
}
