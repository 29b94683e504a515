use std::{io::ErrorKind, path::PathBuf};

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{append, find, remove, replace, RepositoryError, VenueRepository};
use crate::models::{AdminVenue, VenueFields};

/// Keeps every listing in one JSON array on disk.
///
/// The file is read whole on every operation and rewritten whole on every
/// mutation. Writers inside this process are serialised; across processes
/// the last writer wins.
#[derive(Debug)]
pub struct FileVenueRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileVenueRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<AdminVenue>, RepositoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, venues: &[AdminVenue]) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(venues)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // write-then-rename so readers never see a half-written file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), count = venues.len(), "venue store rewritten");
        Ok(())
    }
}

impl VenueRepository for FileVenueRepository {
    fn list(&self) -> BoxFuture<'_, Result<Vec<AdminVenue>, RepositoryError>> {
        Box::pin(self.load())
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(async move { find(&self.load().await?, id) })
    }

    fn create(&self, fields: VenueFields) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut venues = self.load().await?;
            let venue = append(&mut venues, fields);
            self.store(&venues).await?;
            Ok(venue)
        })
    }

    fn update(
        &self,
        id: Uuid,
        fields: VenueFields,
    ) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut venues = self.load().await?;
            let venue = replace(&mut venues, id, fields)?;
            self.store(&venues).await?;
            Ok(venue)
        })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), RepositoryError>> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut venues = self.load().await?;
            remove(&mut venues, id)?;
            self.store(&venues).await
        })
    }
}
