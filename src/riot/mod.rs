//! Access to the upstream account and match API.

pub mod client;
pub mod error;
pub mod models;
pub mod rate_gate;
pub mod routing;

pub use client::RiotClient;
pub use error::{ApiError, ApiResult};
pub use rate_gate::RateGate;
pub use routing::{Region, Routing, Shard};
