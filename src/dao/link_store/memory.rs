use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;

use crate::dao::storage::{StorageError, StorageResult};

use super::{LinkMap, LinkStore};

/// Volatile link store, used when no persistence is wanted and in tests.
#[derive(Clone, Default)]
pub struct MemoryLinkStore {
    links: Arc<Mutex<LinkMap>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryLinkStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing links.
    pub fn with_links(links: LinkMap) -> Self {
        Self {
            links: Arc::new(Mutex::new(links)),
            fail_saves: Arc::default(),
        }
    }

    /// Make every subsequent save fail, to exercise write-failure handling.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Copy of what was last saved.
    pub fn snapshot(&self) -> LinkMap {
        self.links
            .lock()
            .map(|links| links.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("memory store configured to reject writes")]
struct RejectedWrite;

impl LinkStore for MemoryLinkStore {
    fn load_links(&self) -> BoxFuture<'static, StorageResult<LinkMap>> {
        let links = self.snapshot();
        Box::pin(async move { Ok(links) })
    }

    fn save_links(&self, links: LinkMap) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.fail_saves.load(Ordering::SeqCst) {
                return Err(StorageError::unavailable("save rejected", RejectedWrite));
            }
            match store.links.lock() {
                Ok(mut guard) => *guard = links,
                Err(poisoned) => *poisoned.into_inner() = links,
            }
            Ok(())
        })
    }
}
