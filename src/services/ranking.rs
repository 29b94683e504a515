//! Venue search: text/time-slot filtering and proximity ranking.
//!
//! Everything here is a pure function of its inputs and is re-run whenever the
//! query, time filter, observer or catalog changes.

use serde::Serialize;

use crate::models::{Coordinate, TimeSlot, Venue};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Hourly labels offered by the time filter.
pub const TIME_FILTER_OPTIONS: [&str; 17] = [
    "06:00", "07:00", "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00",
    "16:00", "17:00", "18:00", "19:00", "20:00", "21:00", "22:00",
];

/// Number of slots shown on a venue card.
pub const SLOT_PREVIEW_LEN: usize = 4;

/// Labels offered by the time filter picker.
pub fn time_filter_options() -> &'static [&'static str] {
    &TIME_FILTER_OPTIONS
}

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Renders a distance for display: metres under one kilometre, otherwise
/// kilometres with one decimal.
pub fn format_distance(distance_km: Option<f64>) -> String {
    match distance_km {
        None => "distance unknown".to_string(),
        Some(km) if km < 1.0 => format!("{:.0}m", km * 1000.0),
        Some(km) => format!("{km:.1}km"),
    }
}

/// Search state driving a ranking pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchCriteria<'q> {
    pub query: &'q str,
    pub time_filter: Option<&'q str>,
    pub observer: Option<Coordinate>,
}

/// A catalog venue that survived filtering, with its transient distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedVenue<'a> {
    pub venue: &'a Venue,
    /// `None` when no observer was known.
    pub distance_km: Option<f64>,
}

/// Filters and orders `catalog` for display.
///
/// Text matching is a case-insensitive substring test on name or address.
/// A time filter keeps only venues with an open slot of exactly that label.
/// Results are sorted by distance when an observer is present and otherwise
/// keep catalog order.
pub fn rank_venues<'a>(catalog: &'a [Venue], criteria: &SearchCriteria<'_>) -> Vec<RankedVenue<'a>> {
    let needle = (!criteria.query.trim().is_empty()).then(|| criteria.query.to_lowercase());

    let mut ranked: Vec<RankedVenue<'a>> = catalog
        .iter()
        .filter(|venue| needle.as_deref().is_none_or(|q| matches_query(venue, q)))
        .filter(|venue| criteria.time_filter.is_none_or(|label| venue.has_open_slot(label)))
        .map(|venue| RankedVenue {
            venue,
            distance_km: criteria
                .observer
                .map(|origin| haversine_km(origin, venue.coordinate)),
        })
        .collect();

    if criteria.observer.is_some() {
        // stable: equal distances keep catalog order
        ranked.sort_by(|a, b| {
            let a = a.distance_km.unwrap_or(f64::INFINITY);
            let b = b.distance_km.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
    }

    ranked
}

fn matches_query(venue: &Venue, lowered_query: &str) -> bool {
    venue.name.to_lowercase().contains(lowered_query)
        || venue.address.to_lowercase().contains(lowered_query)
}

/// Slots shown on a venue card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotPreview<'a> {
    pub slots: Vec<&'a TimeSlot>,
    /// Matching slots left off the card.
    pub more: usize,
    pub has_availability: bool,
}

/// Slots matching the time filter (all slots without one), trimmed to the
/// card length. Availability considers every matching slot, not only the
/// previewed ones.
pub fn slot_preview<'a>(venue: &'a Venue, time_filter: Option<&str>) -> SlotPreview<'a> {
    let matching: Vec<&TimeSlot> = venue
        .available_slots
        .iter()
        .filter(|slot| time_filter.is_none_or(|label| slot.time == label))
        .collect();
    let has_availability = matching.iter().any(|slot| slot.available);
    let more = matching.len().saturating_sub(SLOT_PREVIEW_LEN);

    SlotPreview {
        slots: matching.into_iter().take(SLOT_PREVIEW_LEN).collect(),
        more,
        has_availability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn fixture() -> Vec<Venue> {
        Catalog::builtin().expect("fixtures parse").venues().to_vec()
    }

    fn ids(ranked: &[RankedVenue<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.venue.id.clone()).collect()
    }

    #[test]
    fn empty_criteria_returns_catalog_in_order() {
        let catalog = fixture();
        let ranked = rank_venues(&catalog, &SearchCriteria::default());
        assert_eq!(ids(&ranked), vec!["1", "2", "3", "4", "5", "6"]);
        assert!(ranked.iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn query_matches_name_case_insensitively() {
        let catalog = fixture();
        let criteria = SearchCriteria {
            query: "GOAL",
            ..Default::default()
        };
        assert_eq!(ids(&rank_venues(&catalog, &criteria)), vec!["2"]);
    }

    #[test]
    fn query_matches_address() {
        let catalog = fixture();
        let criteria = SearchCriteria {
            query: "lalitpur",
            ..Default::default()
        };
        assert_eq!(ids(&rank_venues(&catalog, &criteria)), vec!["6"]);
    }

    #[test]
    fn whitespace_query_does_not_filter() {
        let catalog = fixture();
        let criteria = SearchCriteria {
            query: "   ",
            ..Default::default()
        };
        assert_eq!(rank_venues(&catalog, &criteria).len(), catalog.len());
    }

    #[test]
    fn time_filter_requires_open_slot() {
        let catalog = fixture();
        let criteria = SearchCriteria {
            time_filter: Some("20:00"),
            ..Default::default()
        };
        // venue 3 has 20:00 but it is booked
        assert_eq!(ids(&rank_venues(&catalog, &criteria)), vec!["1", "5", "6"]);
    }

    #[test]
    fn time_filter_with_unknown_label_matches_nothing() {
        let catalog = fixture();
        let criteria = SearchCriteria {
            time_filter: Some("03:00"),
            ..Default::default()
        };
        assert!(rank_venues(&catalog, &criteria).is_empty());
    }

    #[test]
    fn observer_sorts_by_distance() {
        let catalog = fixture();
        let criteria = SearchCriteria {
            observer: Some(Coordinate::new(27.7172, 85.3240)),
            ..Default::default()
        };
        let ranked = rank_venues(&catalog, &criteria);
        assert_eq!(ranked.len(), 6);
        assert_eq!(ranked[0].venue.id, "3");
        let distances: Vec<f64> = ranked.iter().filter_map(|r| r.distance_km).collect();
        assert_eq!(distances.len(), 6);
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_catalog_is_empty_result() {
        let criteria = SearchCriteria {
            query: "arena",
            observer: Some(Coordinate::new(0.0, 0.0)),
            ..Default::default()
        };
        assert!(rank_venues(&[], &criteria).is_empty());
    }

    #[test]
    fn haversine_zero_for_same_point() {
        let p = Coordinate::new(27.7172, 85.3240);
        assert!(haversine_km(p, p).abs() < 1e-12);
    }

    #[test]
    fn haversine_quarter_meridian() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 0.0));
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn distance_formatting() {
        assert_eq!(format_distance(Some(0.25)), "250m");
        assert_eq!(format_distance(Some(0.9996)), "1000m");
        assert_eq!(format_distance(Some(1.0)), "1.0km");
        assert_eq!(format_distance(Some(3.456)), "3.5km");
        assert_eq!(format_distance(None), "distance unknown");
    }

    #[test]
    fn preview_limits_to_four_slots() {
        let catalog = fixture();
        let preview = slot_preview(&catalog[0], None);
        assert_eq!(preview.slots.len(), SLOT_PREVIEW_LEN);
        assert_eq!(preview.more, 4);
        assert!(preview.has_availability);
    }

    #[test]
    fn preview_with_filter_reports_booked_slot() {
        let catalog = fixture();
        // venue 1 has 18:00 booked
        let preview = slot_preview(&catalog[0], Some("18:00"));
        assert_eq!(preview.slots.len(), 1);
        assert_eq!(preview.more, 0);
        assert!(!preview.has_availability);
    }

    #[test]
    fn time_filter_options_are_hourly() {
        assert_eq!(TIME_FILTER_OPTIONS.first(), Some(&"06:00"));
        assert_eq!(TIME_FILTER_OPTIONS.last(), Some(&"22:00"));
    }
}
