use aero_core::whitelist::WhitelistedUser;
use aero_search::whitelist::DEFAULT_PAGE_SIZE;
use aero_search::{CreateWhitelistEntry, UpdateWhitelistEntry};
use aero_shared::{Page, PageQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::middleware::AdminUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleAirlineRequest {
    pub airline_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    #[serde(default)]
    pub email: String,
    pub airline_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub email: String,
    pub whitelisted: bool,
    pub enabled_airlines: Vec<String>,
    /// Only reported for whitelisted emails asked about an airline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_access: Option<bool>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/whitelist", get(list_entries).post(create_entry))
        .route(
            "/admin/whitelist/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/admin/whitelist/{id}/toggle-airline", post(toggle_airline))
        .route("/whitelist/check", get(check_access))
}

/// GET /admin/whitelist
async fn list_entries(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<WhitelistedUser>>, AppError> {
    Ok(Json(state.whitelist.list(page.resolve(DEFAULT_PAGE_SIZE)).await?))
}

/// POST /admin/whitelist
async fn create_entry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateWhitelistEntry>,
) -> Result<(StatusCode, Json<WhitelistedUser>), AppError> {
    let entry = state.whitelist.create(req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /admin/whitelist/{id}
async fn get_entry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<WhitelistedUser>, AppError> {
    Ok(Json(state.whitelist.get(&id).await?))
}

/// PUT /admin/whitelist/{id}
async fn update_entry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateWhitelistEntry>,
) -> Result<Json<WhitelistedUser>, AppError> {
    Ok(Json(state.whitelist.update(&id, req).await?))
}

/// DELETE /admin/whitelist/{id}
async fn delete_entry(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.whitelist.delete(&id).await?;
    Ok(Json(json!({ "message": "whitelist entry deleted" })))
}

/// POST /admin/whitelist/{id}/toggle-airline
async fn toggle_airline(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<ToggleAirlineRequest>,
) -> Result<Json<WhitelistedUser>, AppError> {
    Ok(Json(state.whitelist.toggle_airline_access(&id, &req.airline_id).await?))
}

/// GET /whitelist/check?email=&airline_id=
async fn check_access(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, AppError> {
    let email = query.email.trim().to_string();
    if email.is_empty() {
        return Err(AppError::ValidationError("email is required".to_string()));
    }

    let whitelisted = state.whitelist.is_whitelisted(&email).await?;
    let enabled = state.whitelist.enabled_airlines(&email).await?;
    let has_access = query
        .airline_id
        .as_deref()
        .map(str::trim)
        .filter(|id| whitelisted && !id.is_empty())
        .map(|id| enabled.contains(id));

    let mut enabled_airlines: Vec<String> = enabled.into_iter().collect();
    enabled_airlines.sort();

    Ok(Json(CheckResponse {
        email,
        whitelisted,
        enabled_airlines,
        has_access,
    }))
}
