pub mod airline_repo;
pub mod airport_repo;
pub mod app_config;
pub mod database;
mod error;
pub mod order_repo;
pub mod schedule_repo;
pub mod user_repo;
pub mod whitelist_repo;

pub use airline_repo::StoreAirlineRepository;
pub use airport_repo::StoreAirportRepository;
pub use database::{DataSources, DbClient};
pub use order_repo::StoreOrderRepository;
pub use schedule_repo::StoreScheduleRepository;
pub use user_repo::StoreUserRepository;
pub use whitelist_repo::StoreWhitelistRepository;
