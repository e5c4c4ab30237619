pub mod link_store;
/// Stored entities.
pub mod models;
/// Backend-neutral storage errors.
pub mod storage;
