pub mod auth;

pub use auth::{authenticate, AdminUser, Claims, CurrentUser, Policy, Requester};
