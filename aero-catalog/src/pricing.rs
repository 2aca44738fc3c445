use aero_core::booking::PassengerType;
use aero_core::catalog::{CabinClass, Schedule};
use serde::{Deserialize, Serialize};

/// Fare ratios applied to the cabin price per passenger type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Share of the adult fare a child pays
    pub child_ratio: f64,
    /// Share of the adult fare an infant pays
    pub infant_ratio: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            child_ratio: 0.75,
            infant_ratio: 0.0,
        }
    }
}

/// Result of pricing a party on one schedule and cabin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareQuote {
    pub cabin_class: CabinClass,
    /// Adult fare for the cabin
    pub unit_price: f64,
    pub total_amount: f64,
}

pub struct PricingEngine {
    config: PricingConfig,
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn passenger_fare(&self, unit_price: f64, passenger_type: PassengerType) -> f64 {
        match passenger_type {
            PassengerType::Adult => unit_price,
            PassengerType::Child => unit_price * self.config.child_ratio,
            PassengerType::Infant => unit_price * self.config.infant_ratio,
        }
    }

    pub fn quote(&self, schedule: &Schedule, cabin_class: CabinClass, passengers: &[PassengerType]) -> FareQuote {
        let unit_price = schedule.price_for(cabin_class);
        let total_amount = passengers
            .iter()
            .map(|p| self.passenger_fare(unit_price, *p))
            .sum();

        FareQuote {
            cabin_class,
            unit_price,
            total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::DaysOfWeek;
    use chrono::{NaiveDate, Utc};

    fn schedule(economy: f64, business: f64, first: f64) -> Schedule {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Schedule {
            id: "s-1".into(),
            airline_id: "ga".into(),
            flight_number: "GA-100".into(),
            departure_airport_id: "cgk".into(),
            departure_terminal: "3".into(),
            departure_time: "06:00".into(),
            arrival_airport_id: "dps".into(),
            arrival_terminal: "I".into(),
            arrival_time: "08:30".into(),
            duration_minutes: 150,
            aircraft: "Boeing 737-800".into(),
            days_of_week: DaysOfWeek::every_day(),
            economy_price: economy,
            business_price: business,
            first_class_price: first,
            economy_seats: 150,
            business_seats: 30,
            first_class_seats: 10,
            is_active: true,
            valid_from: today,
            valid_until: today,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_mixed_party_total() {
        let engine = PricingEngine::default();
        let party = [
            PassengerType::Adult,
            PassengerType::Adult,
            PassengerType::Child,
            PassengerType::Infant,
        ];
        let quote = engine.quote(&schedule(1000.0, 3000.0, 6000.0), CabinClass::Economy, &party);
        assert_eq!(quote.unit_price, 1000.0);
        assert!((quote.total_amount - 2750.0).abs() < 1e-9);
    }

    #[test]
    fn test_cabin_selects_price() {
        let engine = PricingEngine::default();
        let s = schedule(1000.0, 3000.0, 6000.0);
        let party = [PassengerType::Adult];
        assert_eq!(engine.quote(&s, CabinClass::Business, &party).total_amount, 3000.0);
        assert_eq!(engine.quote(&s, CabinClass::First, &party).total_amount, 6000.0);
    }

    #[test]
    fn test_infant_is_free() {
        let engine = PricingEngine::default();
        assert_eq!(engine.passenger_fare(800_000.0, PassengerType::Infant), 0.0);
        assert_eq!(engine.passenger_fare(800_000.0, PassengerType::Child), 600_000.0);
    }
}
