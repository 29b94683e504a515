use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{append, find, remove, replace, RepositoryError, VenueRepository};
use crate::models::{AdminVenue, VenueFields};

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryVenueRepository {
    venues: RwLock<Vec<AdminVenue>>,
}

impl MemoryVenueRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VenueRepository for MemoryVenueRepository {
    fn list(&self) -> BoxFuture<'_, Result<Vec<AdminVenue>, RepositoryError>> {
        Box::pin(async move { Ok(self.venues.read().await.clone()) })
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(async move { find(&self.venues.read().await, id) })
    }

    fn create(&self, fields: VenueFields) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(async move { Ok(append(&mut *self.venues.write().await, fields)) })
    }

    fn update(
        &self,
        id: Uuid,
        fields: VenueFields,
    ) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(async move { replace(&mut self.venues.write().await, id, fields) })
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), RepositoryError>> {
        Box::pin(async move { remove(&mut *self.venues.write().await, id) })
    }
}
