use aero_core::catalog::{CabinClass, ScheduleDetail};
use aero_search::{FlightSearchQuery, SearchOutcome};
use aero_shared::PageRequest;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::middleware::Policy;
use crate::state::AppState;

const PAGE_SIZE: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct FlightSearchParams {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub departure_date: String,
    pub cabin_class: Option<String>,
    /// Comma-separated airline ids
    pub airlines: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl FlightSearchParams {
    fn into_query(self) -> Result<FlightSearchQuery, AppError> {
        let departure_date = NaiveDate::parse_from_str(self.departure_date.trim(), "%Y-%m-%d").map_err(|_| {
            AppError::ValidationError("departure_date must be formatted YYYY-MM-DD".to_string())
        })?;
        let airline_ids = self
            .airlines
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(FlightSearchQuery {
            origin: self.origin,
            destination: self.destination,
            departure_date,
            cabin_class: CabinClass::parse_or_economy(self.cabin_class.as_deref().unwrap_or_default()),
            airline_ids,
            page: PageRequest::resolve(self.page, self.page_size, PAGE_SIZE),
        })
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights/search", get(search_flights))
        .route("/flights/{id}", get(get_flight))
}

/// GET /flights/search
/// Whitelisted callers see production data for their enabled airlines.
async fn search_flights(
    State(state): State<AppState>,
    Policy(policy): Policy,
    Query(params): Query<FlightSearchParams>,
) -> Result<Json<SearchOutcome>, AppError> {
    let query = params.into_query()?;
    let outcome = state.flights.search(&query, &policy).await?;
    info!(
        origin = %query.origin,
        destination = %query.destination,
        results = outcome.page.total_items,
        "flight search"
    );
    Ok(Json(outcome))
}

/// GET /flights/{id}
async fn get_flight(
    State(state): State<AppState>,
    Policy(policy): Policy,
    Path(id): Path<String>,
) -> Result<Json<ScheduleDetail>, AppError> {
    Ok(Json(state.schedules.get(policy.source(), &id).await?))
}
