use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{RepositoryError, VenueRepository};
use crate::models::{AdminVenue, CourtType, VenueFields};

const SELECT_COLUMNS: &str = "id, name, address, google_plus_code, weekday_price, weekend_price, \
     court_types, contact, photo, description, created_at, updated_at";

#[derive(Clone)]
pub struct PgVenueRepository {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct VenueRow {
    id: Uuid,
    name: String,
    address: String,
    google_plus_code: String,
    weekday_price: i32,
    weekend_price: i32,
    court_types: Vec<String>,
    contact: String,
    photo: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VenueRow> for AdminVenue {
    type Error = RepositoryError;

    fn try_from(row: VenueRow) -> Result<Self, Self::Error> {
        let court_types = row
            .court_types
            .iter()
            .map(|c| c.parse::<CourtType>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::Storage)?;

        Ok(AdminVenue {
            id: row.id,
            fields: VenueFields {
                name: row.name,
                address: row.address,
                google_plus_code: row.google_plus_code,
                weekday_price: price_from_db(row.weekday_price)?,
                weekend_price: price_from_db(row.weekend_price)?,
                court_types,
                contact: row.contact,
                photo: row.photo,
                description: row.description,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn price_from_db(value: i32) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::Storage(format!("negative price {value}")))
}

fn price_to_db(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value).map_err(|_| RepositoryError::Storage(format!("price {value} out of range")))
}

fn court_types_to_db(court_types: &[CourtType]) -> Vec<String> {
    court_types.iter().map(|c| c.as_str().to_string()).collect()
}

impl PgVenueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool and applies pending migrations.
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        info!(pool_size, "database connected");

        sqlx::migrate!("./src/migrations")
            .run(&pool)
            .await
            .map_err(|e| RepositoryError::Storage(format!("migration failed: {e}")))?;
        info!("migrations completed");

        Ok(Self::new(pool))
    }

    async fn fetch_all(&self) -> Result<Vec<AdminVenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM admin_venues ORDER BY position"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AdminVenue::try_from).collect()
    }

    async fn fetch_one(&self, id: Uuid) -> Result<AdminVenue, RepositoryError> {
        sqlx::query_as::<_, VenueRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM admin_venues WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(id))?
        .try_into()
    }

    async fn insert(&self, fields: VenueFields) -> Result<AdminVenue, RepositoryError> {
        let venue = AdminVenue::create(fields, Utc::now());
        let f = &venue.fields;

        sqlx::query(
            "INSERT INTO admin_venues \
             (id, name, address, google_plus_code, weekday_price, weekend_price, \
              court_types, contact, photo, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(venue.id)
        .bind(&f.name)
        .bind(&f.address)
        .bind(&f.google_plus_code)
        .bind(price_to_db(f.weekday_price)?)
        .bind(price_to_db(f.weekend_price)?)
        .bind(court_types_to_db(&f.court_types))
        .bind(&f.contact)
        .bind(&f.photo)
        .bind(&f.description)
        .bind(venue.created_at)
        .bind(venue.updated_at)
        .execute(&self.pool)
        .await?;

        info!(venue_id = %venue.id, "venue created");
        Ok(venue)
    }

    async fn replace(&self, id: Uuid, fields: VenueFields) -> Result<AdminVenue, RepositoryError> {
        let row = sqlx::query_as::<_, VenueRow>(&format!(
            "UPDATE admin_venues SET \
                name = $2, address = $3, google_plus_code = $4, weekday_price = $5, \
                weekend_price = $6, court_types = $7, contact = $8, photo = $9, \
                description = $10, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.google_plus_code)
        .bind(price_to_db(fields.weekday_price)?)
        .bind(price_to_db(fields.weekend_price)?)
        .bind(court_types_to_db(&fields.court_types))
        .bind(&fields.contact)
        .bind(&fields.photo)
        .bind(&fields.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound(id))?;

        row.try_into()
    }

    async fn remove(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin_venues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        info!(venue_id = %id, "venue deleted");
        Ok(())
    }
}

impl VenueRepository for PgVenueRepository {
    fn list(&self) -> BoxFuture<'_, Result<Vec<AdminVenue>, RepositoryError>> {
        Box::pin(self.fetch_all())
    }

    fn get(&self, id: Uuid) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(self.fetch_one(id))
    }

    fn create(&self, fields: VenueFields) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(self.insert(fields))
    }

    fn update(
        &self,
        id: Uuid,
        fields: VenueFields,
    ) -> BoxFuture<'_, Result<AdminVenue, RepositoryError>> {
        Box::pin(self.replace(id, fields))
    }

    fn delete(&self, id: Uuid) -> BoxFuture<'_, Result<(), RepositoryError>> {
        Box::pin(self.remove(id))
    }
}
