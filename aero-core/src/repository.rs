use aero_shared::PageRequest;
use async_trait::async_trait;
use mockall::automock;

use crate::account::User;
use crate::booking::Order;
use crate::catalog::{Airline, Airport, Schedule, ScheduleDetail};
use crate::search::ScheduleSearch;
use crate::whitelist::WhitelistedUser;
use crate::CoreResult;

/// Repository trait for airline catalog access
#[automock]
#[async_trait]
pub trait AirlineRepository: Send + Sync {
    async fn create(&self, airline: &Airline) -> CoreResult<()>;

    async fn update(&self, airline: &Airline) -> CoreResult<()>;

    /// Returns `false` when no row matched.
    async fn delete(&self, id: &str) -> CoreResult<bool>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Airline>>;

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Airline>>;

    async fn list(&self, page: PageRequest, active_only: bool) -> CoreResult<(Vec<Airline>, i64)>;

    async fn list_active(&self) -> CoreResult<Vec<Airline>>;
}

/// Repository trait for airport catalog access
#[automock]
#[async_trait]
pub trait AirportRepository: Send + Sync {
    async fn create(&self, airport: &Airport) -> CoreResult<()>;

    async fn update(&self, airport: &Airport) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<bool>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Airport>>;

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Airport>>;

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<Airport>, i64)>;

    async fn list_all(&self) -> CoreResult<Vec<Airport>>;

    /// Case-insensitive substring match on code, city and name.
    async fn search(&self, query: &str) -> CoreResult<Vec<Airport>>;
}

/// Repository trait for schedule data access. Reads return schedules joined
/// with their airline and airports.
#[automock]
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: &Schedule) -> CoreResult<()>;

    async fn update(&self, schedule: &Schedule) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<bool>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<ScheduleDetail>>;

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<ScheduleDetail>, i64)>;

    async fn list_by_airline(
        &self,
        airline_id: &str,
        page: PageRequest,
    ) -> CoreResult<(Vec<ScheduleDetail>, i64)>;

    /// Active schedules matching the filter, ordered by departure time.
    async fn search(&self, filter: &ScheduleSearch) -> CoreResult<(Vec<ScheduleDetail>, i64)>;
}

/// Repository trait for whitelist entries
#[automock]
#[async_trait]
pub trait WhitelistRepository: Send + Sync {
    async fn create(&self, entry: &WhitelistedUser) -> CoreResult<()>;

    async fn update(&self, entry: &WhitelistedUser) -> CoreResult<()>;

    async fn delete(&self, id: &str) -> CoreResult<bool>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<WhitelistedUser>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<WhitelistedUser>>;

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<WhitelistedUser>, i64)>;
}

/// Repository trait for user accounts
#[automock]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> CoreResult<()>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;
}

/// Repository trait for order data access
#[automock]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order and all of its passengers atomically.
    async fn create(&self, order: &Order) -> CoreResult<()>;

    /// Persists status and contact changes.
    async fn update(&self, order: &Order) -> CoreResult<()>;

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>>;

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<Order>, i64)>;

    async fn list_by_user(&self, user_id: &str, page: PageRequest) -> CoreResult<(Vec<Order>, i64)>;
}
