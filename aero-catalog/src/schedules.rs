use aero_core::catalog::{
    default_validity, new_id, Schedule, ScheduleDetail, DEFAULT_BUSINESS_SEATS, DEFAULT_ECONOMY_SEATS,
    DEFAULT_FIRST_CLASS_SEATS,
};
use aero_core::repository::{AirlineRepository, AirportRepository, ScheduleRepository};
use aero_core::search::ScheduleSearch;
use aero_core::{CoreError, CoreResult, DataSource, DaysOfWeek, SourceScope, Sources};
use aero_shared::validate::is_valid_clock_time;
use aero_shared::{Page, PageRequest};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchedule {
    pub airline_id: String,
    pub flight_number: String,
    pub departure_airport_id: String,
    #[serde(default)]
    pub departure_terminal: String,
    pub departure_time: String,
    pub arrival_airport_id: String,
    #[serde(default)]
    pub arrival_terminal: String,
    pub arrival_time: String,
    #[serde(alias = "duration")]
    pub duration_minutes: i32,
    #[serde(default)]
    pub aircraft: String,
    pub days_of_week: Option<String>,
    #[serde(default)]
    pub economy_price: f64,
    #[serde(default)]
    pub business_price: f64,
    #[serde(default)]
    pub first_class_price: f64,
    pub economy_seats: Option<i32>,
    pub business_seats: Option<i32>,
    pub first_class_seats: Option<i32>,
    pub is_active: Option<bool>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSchedule {
    pub airline_id: Option<String>,
    pub flight_number: Option<String>,
    pub departure_airport_id: Option<String>,
    pub departure_terminal: Option<String>,
    pub departure_time: Option<String>,
    pub arrival_airport_id: Option<String>,
    pub arrival_terminal: Option<String>,
    pub arrival_time: Option<String>,
    #[serde(alias = "duration")]
    pub duration_minutes: Option<i32>,
    pub aircraft: Option<String>,
    pub days_of_week: Option<String>,
    pub economy_price: Option<f64>,
    pub business_price: Option<f64>,
    pub first_class_price: Option<f64>,
    pub economy_seats: Option<i32>,
    pub business_seats: Option<i32>,
    pub first_class_seats: Option<i32>,
    pub is_active: Option<bool>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

impl CreateSchedule {
    fn into_schedule(self, today: NaiveDate) -> CoreResult<Schedule> {
        let days_of_week = match self.days_of_week.as_deref().map(str::trim) {
            None | Some("") => DaysOfWeek::every_day(),
            Some(raw) => DaysOfWeek::parse(raw)?,
        };
        let (default_from, default_until) = default_validity(today);
        let now = Utc::now();

        Ok(Schedule {
            id: new_id(),
            airline_id: self.airline_id.trim().to_string(),
            flight_number: self.flight_number.trim().to_string(),
            departure_airport_id: self.departure_airport_id.trim().to_string(),
            departure_terminal: self.departure_terminal,
            departure_time: self.departure_time,
            arrival_airport_id: self.arrival_airport_id.trim().to_string(),
            arrival_terminal: self.arrival_terminal,
            arrival_time: self.arrival_time,
            duration_minutes: self.duration_minutes,
            aircraft: self.aircraft,
            days_of_week,
            economy_price: self.economy_price,
            business_price: self.business_price,
            first_class_price: self.first_class_price,
            economy_seats: self.economy_seats.unwrap_or(DEFAULT_ECONOMY_SEATS),
            business_seats: self.business_seats.unwrap_or(DEFAULT_BUSINESS_SEATS),
            first_class_seats: self.first_class_seats.unwrap_or(DEFAULT_FIRST_CLASS_SEATS),
            is_active: self.is_active.unwrap_or(true),
            valid_from: self.valid_from.unwrap_or(default_from),
            valid_until: self.valid_until.unwrap_or(default_until),
            created_at: now,
            updated_at: now,
        })
    }
}

impl UpdateSchedule {
    fn apply(self, schedule: &mut Schedule) -> CoreResult<()> {
        if let Some(v) = self.airline_id { schedule.airline_id = v; }
        if let Some(v) = self.flight_number { schedule.flight_number = v; }
        if let Some(v) = self.departure_airport_id { schedule.departure_airport_id = v; }
        if let Some(v) = self.departure_terminal { schedule.departure_terminal = v; }
        if let Some(v) = self.departure_time { schedule.departure_time = v; }
        if let Some(v) = self.arrival_airport_id { schedule.arrival_airport_id = v; }
        if let Some(v) = self.arrival_terminal { schedule.arrival_terminal = v; }
        if let Some(v) = self.arrival_time { schedule.arrival_time = v; }
        if let Some(v) = self.duration_minutes { schedule.duration_minutes = v; }
        if let Some(v) = self.aircraft { schedule.aircraft = v; }
        if let Some(v) = self.days_of_week { schedule.days_of_week = DaysOfWeek::parse(&v)?; }
        if let Some(v) = self.economy_price { schedule.economy_price = v; }
        if let Some(v) = self.business_price { schedule.business_price = v; }
        if let Some(v) = self.first_class_price { schedule.first_class_price = v; }
        if let Some(v) = self.economy_seats { schedule.economy_seats = v; }
        if let Some(v) = self.business_seats { schedule.business_seats = v; }
        if let Some(v) = self.first_class_seats { schedule.first_class_seats = v; }
        if let Some(v) = self.is_active { schedule.is_active = v; }
        if let Some(v) = self.valid_from { schedule.valid_from = v; }
        if let Some(v) = self.valid_until { schedule.valid_until = v; }
        schedule.updated_at = Utc::now();
        Ok(())
    }
}

fn validate(schedule: &Schedule) -> CoreResult<()> {
    let fail = |msg: &str| Err(CoreError::ValidationError(msg.to_string()));

    if schedule.airline_id.is_empty() {
        return fail("airline_id is required");
    }
    if schedule.flight_number.is_empty() {
        return fail("flight_number is required");
    }
    if schedule.departure_airport_id.is_empty() || schedule.arrival_airport_id.is_empty() {
        return fail("departure and arrival airports are required");
    }
    if schedule.departure_airport_id == schedule.arrival_airport_id {
        return fail("departure and arrival airports must differ");
    }
    if !is_valid_clock_time(&schedule.departure_time) || !is_valid_clock_time(&schedule.arrival_time) {
        return fail("departure_time and arrival_time must be HH:MM");
    }
    if schedule.duration_minutes <= 0 {
        return fail("duration must be a positive number of minutes");
    }
    let prices = [schedule.economy_price, schedule.business_price, schedule.first_class_price];
    if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return fail("prices must not be negative");
    }
    if schedule.economy_seats < 0 || schedule.business_seats < 0 || schedule.first_class_seats < 0 {
        return fail("seat counts must not be negative");
    }
    if schedule.valid_from > schedule.valid_until {
        return fail("valid_from must not be after valid_until");
    }
    Ok(())
}

// ============================================================================
// Service
// ============================================================================

pub struct ScheduleService {
    schedules: Sources<dyn ScheduleRepository>,
    airlines: Sources<dyn AirlineRepository>,
    airports: Sources<dyn AirportRepository>,
}

impl ScheduleService {
    pub fn new(
        schedules: Sources<dyn ScheduleRepository>,
        airlines: Sources<dyn AirlineRepository>,
        airports: Sources<dyn AirportRepository>,
    ) -> Self {
        Self { schedules, airlines, airports }
    }

    /// Referenced airline and airports must exist in the source being written.
    async fn check_references(&self, source: DataSource, schedule: &Schedule) -> CoreResult<()> {
        if self.airlines.get(source).find_by_id(&schedule.airline_id).await?.is_none() {
            return Err(CoreError::ValidationError(format!(
                "airline '{}' does not exist",
                schedule.airline_id
            )));
        }
        for airport_id in [&schedule.departure_airport_id, &schedule.arrival_airport_id] {
            if self.airports.get(source).find_by_id(airport_id).await?.is_none() {
                return Err(CoreError::ValidationError(format!(
                    "airport '{}' does not exist",
                    airport_id
                )));
            }
        }
        Ok(())
    }

    async fn load(&self, source: DataSource, id: &str) -> CoreResult<ScheduleDetail> {
        self.schedules
            .get(source)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("schedule"))
    }

    pub async fn create(&self, scope: SourceScope, input: CreateSchedule) -> CoreResult<ScheduleDetail> {
        let schedule = input.into_schedule(Utc::now().date_naive())?;
        validate(&schedule)?;
        let primary = scope.primary();
        self.check_references(primary, &schedule).await?;

        self.schedules.get(primary).create(&schedule).await?;
        info!(schedule_id = %schedule.id, flight = %schedule.flight_number, source = %primary, "schedule created");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.schedules.get(replica).create(&schedule).await {
                warn!(schedule_id = %schedule.id, %replica, error = %err, "failed to mirror schedule create");
            }
        }

        self.load(primary, &schedule.id).await
    }

    pub async fn get(&self, source: DataSource, id: &str) -> CoreResult<ScheduleDetail> {
        self.load(source, id).await
    }

    pub async fn update(&self, scope: SourceScope, id: &str, input: UpdateSchedule) -> CoreResult<ScheduleDetail> {
        let primary = scope.primary();
        let mut schedule = self.load(primary, id).await?.schedule;
        let references_changed = input.airline_id.is_some()
            || input.departure_airport_id.is_some()
            || input.arrival_airport_id.is_some();

        input.apply(&mut schedule)?;
        validate(&schedule)?;
        if references_changed {
            self.check_references(primary, &schedule).await?;
        }

        self.schedules.get(primary).update(&schedule).await?;
        info!(schedule_id = %schedule.id, source = %primary, "schedule updated");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.schedules.get(replica).update(&schedule).await {
                warn!(schedule_id = %schedule.id, %replica, error = %err, "failed to mirror schedule update");
            }
        }

        self.load(primary, id).await
    }

    pub async fn delete(&self, scope: SourceScope, id: &str) -> CoreResult<()> {
        if !self.schedules.get(scope.primary()).delete(id).await? {
            return Err(CoreError::not_found("schedule"));
        }
        info!(schedule_id = %id, source = %scope.primary(), "schedule deleted");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.schedules.get(replica).delete(id).await {
                warn!(schedule_id = %id, %replica, error = %err, "failed to mirror schedule delete");
            }
        }
        Ok(())
    }

    pub async fn list(&self, source: DataSource, page: PageRequest) -> CoreResult<Page<ScheduleDetail>> {
        let (items, total) = self.schedules.get(source).list(page).await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn list_by_airline(
        &self,
        source: DataSource,
        airline_id: &str,
        page: PageRequest,
    ) -> CoreResult<Page<ScheduleDetail>> {
        let (items, total) = self.schedules.get(source).list_by_airline(airline_id, page).await?;
        Ok(Page::new(items, page, total))
    }

    /// Active schedules on a route, ordered by departure time.
    pub async fn search(&self, source: DataSource, filter: &ScheduleSearch) -> CoreResult<Page<ScheduleDetail>> {
        let (items, total) = self.schedules.get(source).search(filter).await?;
        Ok(Page::new(items, filter.page, total))
    }
}
