use aero_core::booking::Order;
use aero_order::UpdateOrder;
use aero_shared::{Page, PageQuery};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::error::AppError;
use crate::middleware::AdminUser;
use crate::state::AppState;

const PAGE_SIZE: u32 = 10;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{id}", get(get_order).put(update_order))
}

/// GET /admin/orders
async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<Order>>, AppError> {
    Ok(Json(state.orders.list_orders(page.resolve(PAGE_SIZE)).await?))
}

/// GET /admin/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    Ok(Json(state.orders.admin_get(&id).await?))
}

/// PUT /admin/orders/{id}
async fn update_order(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrder>,
) -> Result<Json<Order>, AppError> {
    tracing::debug!(admin_id = %admin.user_id, order_id = %id, "admin order update");
    Ok(Json(state.orders.admin_update(&id, req).await?))
}
