use criterion::{black_box, criterion_group, criterion_main, Criterion};

use futsal_finder::{
    catalog::Catalog,
    models::{Coordinate, Venue},
    services::ranking::{rank_venues, SearchCriteria},
};

// The built-in catalog repeated until it resembles a city-wide listing.
fn large_catalog(copies: usize) -> Vec<Venue> {
    let base = Catalog::builtin().expect("built-in catalog");
    (0..copies)
        .flat_map(|copy| {
            base.venues().iter().cloned().map(move |mut venue| {
                venue.id = format!("{}-{copy}", venue.id);
                venue.coordinate.latitude += copy as f64 * 0.001;
                venue
            })
        })
        .collect()
}

fn bench_rank_venues(c: &mut Criterion) {
    let catalog = large_catalog(500);
    let observer = Some(Coordinate::new(27.7172, 85.3240));

    c.bench_function("rank_unfiltered", |b| {
        b.iter(|| rank_venues(black_box(&catalog), &SearchCriteria::default()))
    });

    c.bench_function("rank_by_distance", |b| {
        let criteria = SearchCriteria {
            observer,
            ..Default::default()
        };
        b.iter(|| rank_venues(black_box(&catalog), black_box(&criteria)))
    });

    c.bench_function("rank_query_time_and_distance", |b| {
        let criteria = SearchCriteria {
            query: "kathmandu",
            time_filter: Some("20:00"),
            observer,
        };
        b.iter(|| rank_venues(black_box(&catalog), black_box(&criteria)))
    });
}

criterion_group!(benches, bench_rank_venues);
criterion_main!(benches);
