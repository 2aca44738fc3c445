pub mod airlines;
pub mod airports;
pub mod pricing;
pub mod schedules;

pub use airlines::{AirlineService, CreateAirline, UpdateAirline};
pub use airports::{AirportService, CreateAirport, UpdateAirport};
pub use pricing::{FareQuote, PricingConfig, PricingEngine};
pub use schedules::{CreateSchedule, ScheduleService, UpdateSchedule};
