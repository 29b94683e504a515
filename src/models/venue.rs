use serde::{Deserialize, Serialize};

use super::Coordinate;

/// One bookable hour (or hour range) at a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Free-form label such as `"20:00"` or `"6-7 PM"`.
    pub time: String,
    pub available: bool,
}

impl TimeSlot {
    pub fn new(time: impl Into<String>, available: bool) -> Self {
        Self {
            time: time.into(),
            available,
        }
    }
}

/// A venue as listed in the browse catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub rating: f32,
    pub review_count: u32,
    pub price_per_hour: u32,
    pub image_url: String,
    pub courts: u32,
    pub available_slots: Vec<TimeSlot>,
}

impl Venue {
    /// True when any slot carries `label` and is open.
    pub fn has_open_slot(&self, label: &str) -> bool {
        self.available_slots
            .iter()
            .any(|slot| slot.time == label && slot.available)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySlots {
    pub weekday: Vec<TimeSlot>,
    pub weekend: Vec<TimeSlot>,
}

/// Full venue record shown on the detail page, with split weekday/weekend pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueDetail {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub rating: f32,
    pub review_count: u32,
    pub weekday_price: u32,
    pub weekend_price: u32,
    pub image_url: String,
    pub images: Vec<String>,
    pub description: String,
    pub phone: String,
    pub opening_time: String,
    pub closing_time: String,
    pub available_slots: WeeklySlots,
}
