use aero_catalog::{AirlineService, AirportService, PricingEngine, ScheduleService};
use aero_core::repository::{
    AirlineRepository, AirportRepository, OrderRepository, ScheduleRepository, UserRepository,
    WhitelistRepository,
};
use aero_core::Sources;
use aero_order::OrderManager;
use aero_search::{FlightSearch, SearchSettings, SourceResolver, WhitelistService};
use std::sync::Arc;

use crate::accounts::AccountService;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub expiration: u64,
}

/// Repositories the application is wired from. Catalog entities exist in
/// both data sources; accounts, whitelist entries and orders live in one.
pub struct Repositories {
    pub airlines: Sources<dyn AirlineRepository>,
    pub airports: Sources<dyn AirportRepository>,
    pub schedules: Sources<dyn ScheduleRepository>,
    pub whitelist: Arc<dyn WhitelistRepository>,
    pub users: Arc<dyn UserRepository>,
    pub orders: Arc<dyn OrderRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthConfig,
    pub accounts: Arc<AccountService>,
    pub airlines: Arc<AirlineService>,
    pub airports: Arc<AirportService>,
    pub schedules: Arc<ScheduleService>,
    pub whitelist: Arc<WhitelistService>,
    pub resolver: Arc<SourceResolver>,
    pub flights: Arc<FlightSearch>,
    pub orders: Arc<OrderManager>,
}

impl AppState {
    pub fn new(auth: AuthConfig, repos: Repositories, search: SearchSettings) -> Self {
        let whitelist = Arc::new(WhitelistService::new(Arc::clone(&repos.whitelist)));
        let flights = FlightSearch::new(
            repos.schedules.clone(),
            Arc::clone(repos.airlines.staging()),
            search,
        );

        Self {
            accounts: Arc::new(AccountService::new(repos.users, auth.clone())),
            airlines: Arc::new(AirlineService::new(repos.airlines.clone())),
            airports: Arc::new(AirportService::new(repos.airports.clone())),
            schedules: Arc::new(ScheduleService::new(
                repos.schedules.clone(),
                repos.airlines,
                repos.airports,
            )),
            resolver: Arc::new(SourceResolver::new(Arc::clone(&whitelist))),
            whitelist,
            flights: Arc::new(flights),
            orders: Arc::new(OrderManager::new(repos.orders, repos.schedules, PricingEngine::default())),
            auth,
        }
    }
}
