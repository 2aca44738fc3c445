use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule_days::DaysOfWeek;

pub const DEFAULT_ECONOMY_SEATS: i32 = 150;
pub const DEFAULT_BUSINESS_SEATS: i32 = 30;
pub const DEFAULT_FIRST_CLASS_SEATS: i32 = 10;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Airline
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airline {
    pub id: String,
    pub code: String,
    pub name: String,
    pub logo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Airline {
    pub fn new(code: String, name: String, logo: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code,
            name,
            logo,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Airport
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Airport {
    pub id: String,
    pub code: String,
    pub city: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Airport {
    pub fn new(code: String, city: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            code,
            city,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Cabin a fare is quoted for. Anything unrecognized is treated as economy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    #[default]
    Economy,
    Business,
    First,
}

impl CabinClass {
    pub fn parse_or_economy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "business" => CabinClass::Business,
            "first" => CabinClass::First,
            _ => CabinClass::Economy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

/// A recurring flight: one row per flight number, operating on `days_of_week`
/// between `valid_from` and `valid_until`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: String,
    pub airline_id: String,
    pub flight_number: String,
    pub departure_airport_id: String,
    pub departure_terminal: String,
    /// `HH:MM`, local to the departure airport
    pub departure_time: String,
    pub arrival_airport_id: String,
    pub arrival_terminal: String,
    pub arrival_time: String,
    pub duration_minutes: i32,
    pub aircraft: String,
    pub days_of_week: DaysOfWeek,
    pub economy_price: f64,
    pub business_price: f64,
    pub first_class_price: f64,
    pub economy_seats: i32,
    pub business_seats: i32,
    pub first_class_seats: i32,
    pub is_active: bool,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    pub fn price_for(&self, cabin: CabinClass) -> f64 {
        match cabin {
            CabinClass::Economy => self.economy_price,
            CabinClass::Business => self.business_price,
            CabinClass::First => self.first_class_price,
        }
    }
}

/// Default validity window for a new schedule: today through one year out.
pub fn default_validity(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let until = today.checked_add_months(Months::new(12)).unwrap_or(today);
    (today, until)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirlineRef {
    pub id: String,
    pub code: String,
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirportRef {
    pub id: String,
    pub code: String,
    pub city: String,
    pub name: String,
}

/// A schedule joined with the airline and airports it references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub airline: AirlineRef,
    pub departure_airport: AirportRef,
    pub arrival_airport: AirportRef,
}
