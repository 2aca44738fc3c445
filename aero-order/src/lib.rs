pub mod manager;
pub mod models;

pub use manager::OrderManager;
pub use models::{CreateOrder, PassengerInput, UpdateOrder};
