//! Persistence backends for user-to-account links.

#[cfg(feature = "couch-store")]
pub mod couchdb;
mod file;
mod memory;

use std::collections::HashMap;

use futures::future::BoxFuture;

use crate::dao::{models::LinkEntity, storage::StorageResult};

pub use self::file::FileLinkStore;
pub use self::memory::MemoryLinkStore;

/// Caller id to linked account.
pub type LinkMap = HashMap<String, LinkEntity>;

/// Abstraction over the persistence layer for user-to-account links.
///
/// Stores persist the whole map at once; concurrent saves resolve as last write wins.
pub trait LinkStore: Send + Sync {
    fn load_links(&self) -> BoxFuture<'static, StorageResult<LinkMap>>;
    fn save_links(&self, links: LinkMap) -> BoxFuture<'static, StorageResult<()>>;
}
