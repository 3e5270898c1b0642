//! JSON file session store
//!
//! All entries live in one JSON object. Writes go to a sibling `.tmp` file
//! that is synced and renamed over the original, so a crash never leaves a
//! half-written session file behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gangway_core::SessionStore;
use gangway_domain::{GangwayError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::errors::InfraError;

type Entries = BTreeMap<String, String>;

/// [`SessionStore`] backed by a JSON file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileSessionStore {
    /// The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        if data.is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_slice(&data).map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "Session file is corrupt");
            GangwayError::from(InfraError::from(err))
        })
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        let data = serde_json::to_vec(entries).map_err(|e| GangwayError::from(InfraError::from(e)))?;
        let temp_path = self.path.with_extension("tmp");

        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| GangwayError::from(InfraError::from(e)))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(|e| GangwayError::from(InfraError::from(e)))?;
        file.write_all(&data).await.map_err(|e| GangwayError::from(InfraError::from(e)))?;
        file.sync_all().await.map_err(|e| GangwayError::from(InfraError::from(e)))?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(|e| GangwayError::from(InfraError::from(e)))?;

        debug!(path = %self.path.display(), entries = entries.len(), "Session file written");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session file removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}
