//! Compiled-in venue fixtures for the browse flow.

use crate::models::{Venue, VenueDetail};

const VENUES_JSON: &str = include_str!("../fixtures/venues.json");
const VENUE_DETAILS_JSON: &str = include_str!("../fixtures/venue_details.json");

/// The static venue catalog: list records plus detail records keyed by id.
#[derive(Debug, Clone)]
pub struct Catalog {
    venues: Vec<Venue>,
    details: Vec<VenueDetail>,
}

impl Catalog {
    pub fn new(venues: Vec<Venue>, details: Vec<VenueDetail>) -> Self {
        Self { venues, details }
    }

    /// Parses the embedded fixture files.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        let venues: Vec<Venue> = serde_json::from_str(VENUES_JSON)?;
        let details: Vec<VenueDetail> = serde_json::from_str(VENUE_DETAILS_JSON)?;
        tracing::debug!(
            venues = venues.len(),
            details = details.len(),
            "loaded venue catalog"
        );
        Ok(Self::new(venues, details))
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn detail(&self, id: &str) -> Option<&VenueDetail> {
        self.details.iter().find(|d| d.id == id)
    }
}
