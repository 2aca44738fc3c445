use aero_core::booking::Order;
use aero_order::CreateOrder;
use aero_shared::{Page, PageQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::middleware::{CurrentUser, Policy};
use crate::state::AppState;

const PAGE_SIZE: u32 = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_my_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/cancel", post(cancel_order))
}

/// POST /orders
/// The schedule is priced from the source its airline is served from.
async fn create_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Policy(policy): Policy,
    Json(req): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.orders.create_order(&actor, &policy, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders
async fn list_my_orders(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Order>>, AppError> {
    Ok(Json(state.orders.list_user_orders(&actor, page.resolve(PAGE_SIZE)).await?))
}

/// GET /orders/{id}
async fn get_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.get_order(&actor, &id).await?))
}

/// POST /orders/{id}/cancel
async fn cancel_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.cancel_order(&actor, &id).await?))
}
