use aero_core::catalog::{AirlineRef, AirportRef, Schedule, ScheduleDetail};
use aero_core::repository::ScheduleRepository;
use aero_core::search::ScheduleSearch;
use aero_core::{CoreError, CoreResult, DaysOfWeek};
use aero_shared::PageRequest;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::error::DbResultExt;

pub struct StoreScheduleRepository {
    pool: PgPool,
}

impl StoreScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Schedule columns plus the joined airline/airport summaries
#[derive(sqlx::FromRow)]
struct ScheduleDetailRow {
    id: String,
    airline_id: String,
    flight_number: String,
    departure_airport_id: String,
    departure_terminal: String,
    departure_time: String,
    arrival_airport_id: String,
    arrival_terminal: String,
    arrival_time: String,
    duration_minutes: i32,
    aircraft: String,
    days_of_week: String,
    economy_price: f64,
    business_price: f64,
    first_class_price: f64,
    economy_seats: i32,
    business_seats: i32,
    first_class_seats: i32,
    is_active: bool,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    airline_code: String,
    airline_name: String,
    airline_logo: Option<String>,
    departure_code: String,
    departure_city: String,
    departure_name: String,
    arrival_code: String,
    arrival_city: String,
    arrival_name: String,
}

impl TryFrom<ScheduleDetailRow> for ScheduleDetail {
    type Error = CoreError;

    fn try_from(row: ScheduleDetailRow) -> Result<Self, Self::Error> {
        let days_of_week = DaysOfWeek::parse(&row.days_of_week).map_err(|e| {
            CoreError::InternalError(format!("schedule {} has corrupt days_of_week: {}", row.id, e))
        })?;

        Ok(ScheduleDetail {
            airline: AirlineRef {
                id: row.airline_id.clone(),
                code: row.airline_code,
                name: row.airline_name,
                logo: row.airline_logo,
            },
            departure_airport: AirportRef {
                id: row.departure_airport_id.clone(),
                code: row.departure_code,
                city: row.departure_city,
                name: row.departure_name,
            },
            arrival_airport: AirportRef {
                id: row.arrival_airport_id.clone(),
                code: row.arrival_code,
                city: row.arrival_city,
                name: row.arrival_name,
            },
            schedule: Schedule {
                id: row.id,
                airline_id: row.airline_id,
                flight_number: row.flight_number,
                departure_airport_id: row.departure_airport_id,
                departure_terminal: row.departure_terminal,
                departure_time: row.departure_time,
                arrival_airport_id: row.arrival_airport_id,
                arrival_terminal: row.arrival_terminal,
                arrival_time: row.arrival_time,
                duration_minutes: row.duration_minutes,
                aircraft: row.aircraft,
                days_of_week,
                economy_price: row.economy_price,
                business_price: row.business_price,
                first_class_price: row.first_class_price,
                economy_seats: row.economy_seats,
                business_seats: row.business_seats,
                first_class_seats: row.first_class_seats,
                is_active: row.is_active,
                valid_from: row.valid_from,
                valid_until: row.valid_until,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        })
    }
}

fn into_details(rows: Vec<ScheduleDetailRow>) -> CoreResult<Vec<ScheduleDetail>> {
    rows.into_iter().map(ScheduleDetail::try_from).collect()
}

const SELECT_DETAIL: &str = r#"
    SELECT s.id, s.airline_id, s.flight_number,
           s.departure_airport_id, s.departure_terminal, s.departure_time,
           s.arrival_airport_id, s.arrival_terminal, s.arrival_time,
           s.duration_minutes, s.aircraft, s.days_of_week,
           s.economy_price, s.business_price, s.first_class_price,
           s.economy_seats, s.business_seats, s.first_class_seats,
           s.is_active, s.valid_from, s.valid_until, s.created_at, s.updated_at,
           al.code AS airline_code, al.name AS airline_name, al.logo AS airline_logo,
           dep.code AS departure_code, dep.city AS departure_city, dep.name AS departure_name,
           arr.code AS arrival_code, arr.city AS arrival_city, arr.name AS arrival_name
    FROM schedules s
    JOIN airlines al ON al.id = s.airline_id
    JOIN airports dep ON dep.id = s.departure_airport_id
    JOIN airports arr ON arr.id = s.arrival_airport_id
"#;

const COUNT_DETAIL: &str = r#"
    SELECT COUNT(*)
    FROM schedules s
    JOIN airlines al ON al.id = s.airline_id
    JOIN airports dep ON dep.id = s.departure_airport_id
    JOIN airports arr ON arr.id = s.arrival_airport_id
"#;

// $1 origin code, $2 destination code, $3 weekday digit, $4 airline ids
const SEARCH_FILTER: &str = r#"
    WHERE s.is_active = TRUE
      AND ($1::TEXT IS NULL OR dep.code = $1)
      AND ($2::TEXT IS NULL OR arr.code = $2)
      AND ($3::TEXT IS NULL OR $3 = ANY(string_to_array(s.days_of_week, ',')))
      AND (cardinality($4::TEXT[]) = 0 OR s.airline_id = ANY($4))
"#;

#[async_trait]
impl ScheduleRepository for StoreScheduleRepository {
    async fn create(&self, schedule: &Schedule) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO schedules (
                id, airline_id, flight_number,
                departure_airport_id, departure_terminal, departure_time,
                arrival_airport_id, arrival_terminal, arrival_time,
                duration_minutes, aircraft, days_of_week,
                economy_price, business_price, first_class_price,
                economy_seats, business_seats, first_class_seats,
                is_active, valid_from, valid_until, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(&schedule.id)
        .bind(&schedule.airline_id)
        .bind(&schedule.flight_number)
        .bind(&schedule.departure_airport_id)
        .bind(&schedule.departure_terminal)
        .bind(&schedule.departure_time)
        .bind(&schedule.arrival_airport_id)
        .bind(&schedule.arrival_terminal)
        .bind(&schedule.arrival_time)
        .bind(schedule.duration_minutes)
        .bind(&schedule.aircraft)
        .bind(schedule.days_of_week.to_string())
        .bind(schedule.economy_price)
        .bind(schedule.business_price)
        .bind(schedule.first_class_price)
        .bind(schedule.economy_seats)
        .bind(schedule.business_seats)
        .bind(schedule.first_class_seats)
        .bind(schedule.is_active)
        .bind(schedule.valid_from)
        .bind(schedule.valid_until)
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await
        .or_core("schedule")?;

        Ok(())
    }

    async fn update(&self, schedule: &Schedule) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE schedules SET
                airline_id = $2, flight_number = $3,
                departure_airport_id = $4, departure_terminal = $5, departure_time = $6,
                arrival_airport_id = $7, arrival_terminal = $8, arrival_time = $9,
                duration_minutes = $10, aircraft = $11, days_of_week = $12,
                economy_price = $13, business_price = $14, first_class_price = $15,
                economy_seats = $16, business_seats = $17, first_class_seats = $18,
                is_active = $19, valid_from = $20, valid_until = $21, updated_at = $22
            WHERE id = $1
            "#,
        )
        .bind(&schedule.id)
        .bind(&schedule.airline_id)
        .bind(&schedule.flight_number)
        .bind(&schedule.departure_airport_id)
        .bind(&schedule.departure_terminal)
        .bind(&schedule.departure_time)
        .bind(&schedule.arrival_airport_id)
        .bind(&schedule.arrival_terminal)
        .bind(&schedule.arrival_time)
        .bind(schedule.duration_minutes)
        .bind(&schedule.aircraft)
        .bind(schedule.days_of_week.to_string())
        .bind(schedule.economy_price)
        .bind(schedule.business_price)
        .bind(schedule.first_class_price)
        .bind(schedule.economy_seats)
        .bind(schedule.business_seats)
        .bind(schedule.first_class_seats)
        .bind(schedule.is_active)
        .bind(schedule.valid_from)
        .bind(schedule.valid_until)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await
        .or_core("schedule")?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_core("schedule")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<ScheduleDetail>> {
        let row = sqlx::query_as::<_, ScheduleDetailRow>(&format!("{} WHERE s.id = $1", SELECT_DETAIL))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_core("schedule")?;

        row.map(ScheduleDetail::try_from).transpose()
    }

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<ScheduleDetail>, i64)> {
        let total: i64 = sqlx::query_scalar(COUNT_DETAIL)
            .fetch_one(&self.pool)
            .await
            .or_core("schedule")?;

        let rows = sqlx::query_as::<_, ScheduleDetailRow>(&format!(
            "{} ORDER BY s.departure_time ASC, s.flight_number ASC LIMIT $1 OFFSET $2",
            SELECT_DETAIL
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("schedule")?;

        Ok((into_details(rows)?, total))
    }

    async fn list_by_airline(
        &self,
        airline_id: &str,
        page: PageRequest,
    ) -> CoreResult<(Vec<ScheduleDetail>, i64)> {
        let total: i64 = sqlx::query_scalar(&format!("{} WHERE s.airline_id = $1", COUNT_DETAIL))
            .bind(airline_id)
            .fetch_one(&self.pool)
            .await
            .or_core("schedule")?;

        let rows = sqlx::query_as::<_, ScheduleDetailRow>(&format!(
            "{} WHERE s.airline_id = $1 ORDER BY s.departure_time ASC LIMIT $2 OFFSET $3",
            SELECT_DETAIL
        ))
        .bind(airline_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("schedule")?;

        Ok((into_details(rows)?, total))
    }

    async fn search(&self, filter: &ScheduleSearch) -> CoreResult<(Vec<ScheduleDetail>, i64)> {
        let day = filter.day_of_week.map(|d| d.to_string());

        let total: i64 = sqlx::query_scalar(&format!("{} {}", COUNT_DETAIL, SEARCH_FILTER))
            .bind(&filter.origin)
            .bind(&filter.destination)
            .bind(&day)
            .bind(&filter.airline_ids)
            .fetch_one(&self.pool)
            .await
            .or_core("schedule")?;

        let rows = sqlx::query_as::<_, ScheduleDetailRow>(&format!(
            "{} {} ORDER BY s.departure_time ASC, s.flight_number ASC LIMIT $5 OFFSET $6",
            SELECT_DETAIL, SEARCH_FILTER
        ))
        .bind(&filter.origin)
        .bind(&filter.destination)
        .bind(&day)
        .bind(&filter.airline_ids)
        .bind(filter.page.limit())
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("schedule")?;

        Ok((into_details(rows)?, total))
    }
}
