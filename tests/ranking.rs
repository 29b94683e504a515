//! Property checks for the search ranking rules.

use proptest::prelude::*;

use futsal_finder::{
    catalog::Catalog,
    models::{Coordinate, TimeSlot, Venue},
    services::{
        pricing::{DayKind, DaySchedule},
        ranking::{haversine_km, rank_venues, SearchCriteria, TIME_FILTER_OPTIONS},
    },
};

const WORDS: [&str; 8] = [
    "Arena", "Futsal", "Goal", "Kick", "Thamel", "Patan", "Valley", "Hub",
];

fn slot_strategy() -> impl Strategy<Value = TimeSlot> {
    (prop::sample::select(TIME_FILTER_OPTIONS.to_vec()), any::<bool>())
        .prop_map(|(time, available)| TimeSlot::new(time, available))
}

fn venue_strategy() -> impl Strategy<Value = Venue> {
    (
        prop::sample::subsequence(WORDS.to_vec(), 1..3),
        prop::sample::select(WORDS.to_vec()),
        27.6f64..27.8,
        85.2f64..85.4,
        prop::collection::vec(slot_strategy(), 0..8),
    )
        .prop_map(|(name_words, area, latitude, longitude, available_slots)| Venue {
            id: String::new(),
            name: name_words.join(" "),
            address: format!("{area}, Kathmandu"),
            coordinate: Coordinate::new(latitude, longitude),
            rating: 4.5,
            review_count: 10,
            price_per_hour: 1500,
            image_url: "https://images.example.com/court.jpg".to_string(),
            courts: 2,
            available_slots,
        })
}

fn catalog_strategy() -> impl Strategy<Value = Vec<Venue>> {
    prop::collection::vec(venue_strategy(), 0..12).prop_map(|mut venues| {
        for (i, venue) in venues.iter_mut().enumerate() {
            venue.id = (i + 1).to_string();
        }
        venues
    })
}

fn ids(venues: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    venues.into_iter().map(|id| id.as_ref().to_string()).collect()
}

proptest! {
    #[test]
    fn query_results_are_exactly_the_matching_venues(
        catalog in catalog_strategy(),
        word in prop::sample::select(WORDS.to_vec()),
        upper in any::<bool>(),
    ) {
        let query = if upper { word.to_uppercase() } else { word.to_lowercase() };
        let criteria = SearchCriteria { query: &query, ..Default::default() };
        let ranked = rank_venues(&catalog, &criteria);

        let needle = word.to_lowercase();
        let expected: Vec<&str> = catalog
            .iter()
            .filter(|v| {
                v.name.to_lowercase().contains(&needle) || v.address.to_lowercase().contains(&needle)
            })
            .map(|v| v.id.as_str())
            .collect();

        prop_assert_eq!(ids(ranked.iter().map(|r| r.venue.id.as_str())), ids(expected));
    }

    #[test]
    fn time_filter_keeps_only_open_matching_slots(
        catalog in catalog_strategy(),
        label in prop::sample::select(TIME_FILTER_OPTIONS.to_vec()),
    ) {
        let criteria = SearchCriteria { time_filter: Some(label), ..Default::default() };
        let ranked = rank_venues(&catalog, &criteria);

        for r in &ranked {
            prop_assert!(r.venue.available_slots.iter().any(|s| s.time == label && s.available));
        }
        let open = catalog
            .iter()
            .filter(|v| v.available_slots.iter().any(|s| s.time == label && s.available))
            .count();
        prop_assert_eq!(ranked.len(), open);
    }

    #[test]
    fn observer_results_are_sorted_by_distance(
        catalog in catalog_strategy(),
        latitude in 27.6f64..27.8,
        longitude in 85.2f64..85.4,
    ) {
        let origin = Coordinate::new(latitude, longitude);
        let criteria = SearchCriteria { observer: Some(origin), ..Default::default() };
        let ranked = rank_venues(&catalog, &criteria);

        prop_assert_eq!(ranked.len(), catalog.len());
        for r in &ranked {
            let expected = haversine_km(origin, r.venue.coordinate);
            prop_assert_eq!(r.distance_km, Some(expected));
        }
        let distances: Vec<f64> = ranked.iter().filter_map(|r| r.distance_km).collect();
        prop_assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn without_observer_catalog_order_is_kept(
        catalog in catalog_strategy(),
        label in prop::option::of(prop::sample::select(TIME_FILTER_OPTIONS.to_vec())),
    ) {
        let criteria = SearchCriteria { time_filter: label, ..Default::default() };
        let ranked = rank_venues(&catalog, &criteria);

        let positions: Vec<usize> = ranked
            .iter()
            .map(|r| catalog.iter().position(|v| v.id == r.venue.id).expect("from catalog"))
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(ranked.iter().all(|r| r.distance_km.is_none()));
    }
}

#[test]
fn haversine_matches_reference_formula() {
    let observer = Coordinate::new(27.7172, 85.3240);
    let venue = Coordinate::new(27.7150, 85.3130);

    let (lat1, lat2) = (observer.latitude.to_radians(), venue.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (venue.longitude - observer.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let reference = 6371.0 * 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    let computed = haversine_km(observer, venue);
    assert!(((computed - reference) / reference).abs() < 1e-6);
    assert!((computed - 1.11).abs() < 0.01);
}

#[test]
fn fixture_filtered_at_eight_pm_includes_champions_arena() {
    let catalog = Catalog::builtin().expect("catalog");
    let criteria = SearchCriteria {
        time_filter: Some("20:00"),
        ..Default::default()
    };
    let ranked = rank_venues(catalog.venues(), &criteria);
    assert!(ranked.iter().any(|r| r.venue.id == "1"));
}

#[test]
fn saturday_uses_weekend_price_and_slots() {
    let catalog = Catalog::builtin().expect("catalog");
    let venue = catalog.detail("1").expect("venue 1");
    let saturday = chrono::NaiveDate::from_ymd_opt(2026, 10, 24).expect("date");

    let schedule = DaySchedule::for_date(venue, saturday);
    assert_eq!(schedule.kind, DayKind::Weekend);
    assert_eq!(schedule.price, 2500);
    assert!(schedule.slot("8-9").expect("8-9 offered").available);
}
