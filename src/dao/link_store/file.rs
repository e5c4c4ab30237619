use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use tokio::fs;

use crate::dao::storage::{StorageError, StorageResult};

use super::{LinkMap, LinkStore};

/// Link store backed by a single JSON document on disk.
#[derive(Clone)]
pub struct FileLinkStore {
    path: Arc<PathBuf>,
}

impl FileLinkStore {
    /// Store reading and writing `path`. The file is created on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    async fn read(&self) -> StorageResult<LinkMap> {
        let contents = match fs::read(self.path.as_ref()).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(LinkMap::new()),
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("failed to read `{}`", self.path.display()),
                    err,
                ));
            }
        };

        serde_json::from_slice(&contents).map_err(|err| {
            StorageError::unavailable(format!("failed to parse `{}`", self.path.display()), err)
        })
    }

    async fn write(&self, links: LinkMap) -> StorageResult<()> {
        let payload = serde_json::to_vec_pretty(&links)
            .map_err(|err| StorageError::unavailable("failed to encode links", err))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|err| {
                StorageError::unavailable(format!("failed to create `{}`", parent.display()), err)
            })?;
        }

        // Readers never see a partial file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await.map_err(|err| {
            StorageError::unavailable(format!("failed to write `{}`", tmp.display()), err)
        })?;
        fs::rename(&tmp, self.path.as_ref()).await.map_err(|err| {
            StorageError::unavailable(
                format!("failed to replace `{}`", self.path.display()),
                err,
            )
        })
    }
}

impl LinkStore for FileLinkStore {
    fn load_links(&self) -> BoxFuture<'static, StorageResult<LinkMap>> {
        let store = self.clone();
        Box::pin(async move { store.read().await })
    }

    fn save_links(&self, links: LinkMap) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(links).await })
    }
}
