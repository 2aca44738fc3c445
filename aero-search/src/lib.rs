pub mod aggregator;
pub mod policy;
pub mod whitelist;

pub use aggregator::{FlightSearch, FlightSearchQuery, SearchHit, SearchOutcome, SearchSettings};
pub use policy::{AccessPolicy, SourceResolver};
pub use whitelist::{CreateWhitelistEntry, UpdateWhitelistEntry, WhitelistService};
