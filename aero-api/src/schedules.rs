use aero_catalog::{CreateSchedule, UpdateSchedule};
use aero_core::catalog::ScheduleDetail;
use aero_core::search::ScheduleSearch;
use aero_shared::validate::normalize_code;
use aero_shared::{Page, PageRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::middleware::AdminUser;
use crate::params::{EnvQuery, ListQuery};
use crate::state::AppState;

const PAGE_SIZE: u32 = 10;

/// Listing filters. Without any filter the whole catalog is paged.
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleListQuery {
    pub env: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// `YYYY-MM-DD`; restricts to schedules operating on that weekday
    pub date: Option<String>,
    pub airline_id: Option<String>,
}

impl ScheduleListQuery {
    fn filter(&self, page: PageRequest) -> Result<Option<ScheduleSearch>, AppError> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let origin = present(&self.origin);
        let destination = present(&self.destination);
        let date = present(&self.date);
        let airline_id = present(&self.airline_id);
        if origin.is_none() && destination.is_none() && date.is_none() && airline_id.is_none() {
            return Ok(None);
        }

        let mut filter = ScheduleSearch {
            origin: origin.as_deref().map(normalize_code),
            destination: destination.as_deref().map(normalize_code),
            ..ScheduleSearch::default()
        }
        .with_page(page);
        if let Some(raw) = date {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| AppError::ValidationError("date must be formatted YYYY-MM-DD".to_string()))?;
            filter = filter.on_date(date);
        }
        if let Some(id) = airline_id {
            filter = filter.for_airline(&id);
        }
        Ok(Some(filter))
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/schedules/{id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
}

/// GET /schedules
async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<ScheduleListQuery>,
) -> Result<Json<Page<ScheduleDetail>>, AppError> {
    let list = ListQuery {
        env: query.env.clone(),
        page: query.page,
        page_size: query.page_size,
    };
    let source = list.read_source()?;
    let page = list.page(PAGE_SIZE);

    let schedules = match query.filter(page)? {
        Some(filter) => state.schedules.search(source, &filter).await?,
        None => state.schedules.list(source, page).await?,
    };
    Ok(Json(schedules))
}

/// GET /schedules/{id}
async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<ScheduleDetail>, AppError> {
    Ok(Json(state.schedules.get(env.read_source()?, &id).await?))
}

/// POST /schedules (admin)
async fn create_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(env): Query<EnvQuery>,
    Json(req): Json<CreateSchedule>,
) -> Result<(StatusCode, Json<ScheduleDetail>), AppError> {
    let schedule = state.schedules.create(env.write_scope()?, req).await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// PUT /schedules/{id} (admin)
async fn update_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
    Json(req): Json<UpdateSchedule>,
) -> Result<Json<ScheduleDetail>, AppError> {
    Ok(Json(state.schedules.update(env.write_scope()?, &id, req).await?))
}

/// DELETE /schedules/{id} (admin)
async fn delete_schedule(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Query(env): Query<EnvQuery>,
) -> Result<Json<Value>, AppError> {
    state.schedules.delete(env.write_scope()?, &id).await?;
    Ok(Json(json!({ "message": "schedule deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_pages_catalog() {
        assert!(ScheduleListQuery::default().filter(PageRequest::default()).unwrap().is_none());
    }

    #[test]
    fn test_filter_from_query() {
        let query = ScheduleListQuery {
            origin: Some("cgk".into()),
            date: Some("2025-06-01".into()),
            airline_id: Some("ga".into()),
            ..Default::default()
        };
        let filter = query.filter(PageRequest::default()).unwrap().unwrap();
        assert_eq!(filter.origin.as_deref(), Some("CGK"));
        assert_eq!(filter.destination, None);
        assert_eq!(filter.day_of_week, Some(7));
        assert_eq!(filter.airline_ids, vec!["ga".to_string()]);
    }

    #[test]
    fn test_bad_date_rejected() {
        let query = ScheduleListQuery { date: Some("June 1".into()), ..Default::default() };
        assert!(query.filter(PageRequest::default()).is_err());
    }
}
