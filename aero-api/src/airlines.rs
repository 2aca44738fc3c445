use aero_catalog::{CreateAirline, UpdateAirline};
use aero_core::catalog::{Airline, ScheduleDetail};
use aero_shared::{Page, PageQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::middleware::{AdminUser, Policy};
use crate::params::{EnvQuery, ListQuery};
use crate::state::AppState;

const PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct AirlineListQuery {
    pub env: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(default)]
    pub active_only: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airlines", get(list_airlines).post(create_airline))
        .route("/airlines/all", get(list_active_airlines))
        .route(
            "/airlines/{id}",
            get(get_airline).put(update_airline).delete(delete_airline),
        )
        .route("/airlines/{id}/schedules", get(list_airline_schedules))
}

/// GET /airlines
async fn list_airlines(
    State(state): State<AppState>,
    Query(query): Query<AirlineListQuery>,
) -> Result<Json<Page<Airline>>, AppError> {
    let list = ListQuery {
        env: query.env,
        page: query.page,
        page_size: query.page_size,
    };
    let page = state
        .airlines
        .list(list.read_source()?, list.page(PAGE_SIZE), query.active_only)
        .await?;
    Ok(Json(page))
}

/// GET /airlines/all
async fn list_active_airlines(
    State(state): State<AppState>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Vec<Airline>>, AppError> {
    Ok(Json(state.airlines.list_active(env.read_source()?).await?))
}

/// GET /airlines/{id}
async fn get_airline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Airline>, AppError> {
    Ok(Json(state.airlines.get(env.read_source()?, &id).await?))
}

/// GET /airlines/{id}/schedules
/// Served from production when the caller is whitelisted for this airline.
async fn list_airline_schedules(
    State(state): State<AppState>,
    Policy(policy): Policy,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Page<ScheduleDetail>>, AppError> {
    let source = policy.source_for_airline(&id);
    let schedules = state
        .schedules
        .list_by_airline(source, &id, page.resolve(PAGE_SIZE))
        .await?;
    Ok(Json(schedules))
}

/// POST /airlines (admin)
async fn create_airline(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(env): Query<EnvQuery>,
    Json(req): Json<CreateAirline>,
) -> Result<(StatusCode, Json<Airline>), AppError> {
    let airline = state.airlines.create(env.write_scope()?, req).await?;
    Ok((StatusCode::CREATED, Json(airline)))
}

/// PUT /airlines/{id} (admin)
async fn update_airline(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
    Json(req): Json<UpdateAirline>,
) -> Result<Json<Airline>, AppError> {
    Ok(Json(state.airlines.update(env.write_scope()?, &id, req).await?))
}

/// DELETE /airlines/{id} (admin)
async fn delete_airline(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Value>, AppError> {
    state.airlines.delete(env.write_scope()?, &id).await?;
    Ok(Json(json!({ "message": "airline deleted" })))
}
