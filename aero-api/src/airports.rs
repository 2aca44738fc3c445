use aero_catalog::{CreateAirport, UpdateAirport};
use aero_core::catalog::Airport;
use aero_shared::Page;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::middleware::AdminUser;
use crate::params::{EnvQuery, ListQuery};
use crate::state::AppState;

const PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct AirportSearchQuery {
    #[serde(default)]
    pub q: String,
    pub env: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airports", get(list_airports).post(create_airport))
        .route("/airports/all", get(list_all_airports))
        .route("/airports/search", get(search_airports))
        .route("/airports/code/{code}", get(get_airport_by_code))
        .route(
            "/airports/{id}",
            get(get_airport).put(update_airport).delete(delete_airport),
        )
}

/// GET /airports
async fn list_airports(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Airport>>, AppError> {
    let page = state
        .airports
        .list(query.read_source()?, query.page(PAGE_SIZE))
        .await?;
    Ok(Json(page))
}

/// GET /airports/all
async fn list_all_airports(
    State(state): State<AppState>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Vec<Airport>>, AppError> {
    Ok(Json(state.airports.list_all(env.read_source()?).await?))
}

/// GET /airports/search?q=
async fn search_airports(
    State(state): State<AppState>,
    Query(query): Query<AirportSearchQuery>,
) -> Result<Json<Vec<Airport>>, AppError> {
    let env = EnvQuery { env: query.env };
    Ok(Json(state.airports.search(env.read_source()?, &query.q).await?))
}

/// GET /airports/code/{code}
async fn get_airport_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Airport>, AppError> {
    Ok(Json(state.airports.get_by_code(env.read_source()?, &code).await?))
}

/// GET /airports/{id}
async fn get_airport(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Airport>, AppError> {
    Ok(Json(state.airports.get(env.read_source()?, &id).await?))
}

/// POST /airports (admin)
async fn create_airport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(env): Query<EnvQuery>,
    Json(req): Json<CreateAirport>,
) -> Result<(StatusCode, Json<Airport>), AppError> {
    let airport = state.airports.create(env.write_scope()?, req).await?;
    Ok((StatusCode::CREATED, Json(airport)))
}

/// PUT /airports/{id} (admin)
async fn update_airport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
    Json(req): Json<UpdateAirport>,
) -> Result<Json<Airport>, AppError> {
    Ok(Json(state.airports.update(env.write_scope()?, &id, req).await?))
}

/// DELETE /airports/{id} (admin)
async fn delete_airport(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Value>, AppError> {
    state.airports.delete(env.write_scope()?, &id).await?;
    Ok(Json(json!({ "message": "airport deleted" })))
}
