//! CouchDB link store backend, enabled by the `couch-store` feature.

pub mod config;
pub mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::{CouchDaoError, CouchResult};
pub use store::CouchLinkStore;
