//! Storage for admin-managed venue listings.
//!
//! Handlers depend only on [`VenueRepository`]; the backend is picked at
//! startup from configuration.

mod file;
mod memory;
mod postgres;

pub use file::FileVenueRepository;
pub use memory::MemoryVenueRepository;
pub use postgres::PgVenueRepository;

use chrono::Utc;
use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AdminVenue, VenueFields};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("venue {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("venue store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("venue store is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Create/read/update/delete of venue listings by id.
///
/// Listing order is insertion order. Updates keep a record's id, position and
/// creation time; creates append; deletes remove exactly one record.
pub trait VenueRepository: Send + Sync {
    fn list(&self) -> BoxFuture<'_, Result<Vec<AdminVenue>, RepositoryError>>;

    fn get(&self, id: Uuid) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>>;

    fn create(&self, fields: VenueFields) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>>;

    fn update(
        &self,
        id: Uuid,
        fields: VenueFields,
    ) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>>;

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), RepositoryError>>;
}

// List mutations shared by the backends that hold the whole list in hand.

fn append(venues: &mut Vec<AdminVenue>, fields: VenueFields) -> AdminVenue {
    let venue = AdminVenue::create(fields, Utc::now());
    venues.push(venue.clone());
    venue
}

fn replace(
    venues: &mut [AdminVenue],
    id: Uuid,
    fields: VenueFields,
) -> Result<AdminVenue, RepositoryError> {
    let venue = venues
        .iter_mut()
        .find(|v| v.id == id)
        .ok_or(RepositoryError::NotFound(id))?;
    venue.replace_fields(fields, Utc::now());
    Ok(venue.clone())
}

fn remove(venues: &mut Vec<AdminVenue>, id: Uuid) -> Result<(), RepositoryError> {
    let index = venues
        .iter()
        .position(|v| v.id == id)
        .ok_or(RepositoryError::NotFound(id))?;
    venues.remove(index);
    Ok(())
}

fn find(venues: &[AdminVenue], id: Uuid) -> Result<AdminVenue, RepositoryError> {
    venues
        .iter()
        .find(|v| v.id == id)
        .cloned()
        .ok_or(RepositoryError::NotFound(id))
}
