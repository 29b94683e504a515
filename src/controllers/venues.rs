use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use super::{path_param, query_params};
use crate::{
    cache::search::search_cache_key,
    error::AppError,
    models::{Coordinate, TimeSlot, VenueDetail},
    services::{
        pricing::{upcoming_dates, DayKind, DaySchedule, SlotSelection, BOOKING_WINDOW_DAYS},
        ranking::{
            format_distance, rank_venues, slot_preview, time_filter_options, RankedVenue,
            SearchCriteria,
        },
    },
    AppState,
};

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(search_venues))
        .route("/venues/{id}", get(venue_detail))
        .route("/venues/{id}/schedule", get(venue_schedule))
        .route("/venues/{id}/dates", get(venue_dates))
        .route("/time-slots", get(time_slots))
}

#[derive(Debug, Default, Deserialize)]
pub struct VenuesQuery {
    pub query: Option<String>,
    pub time: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl VenuesQuery {
    fn observer(&self) -> Result<Option<Coordinate>, AppError> {
        match (self.lat, self.lng) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
            {
                Ok(Some(Coordinate::new(lat, lng)))
            }
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "lat must be within [-90, 90] and lng within [-180, 180]".to_string(),
            )),
            _ => Err(AppError::BadRequest(
                "lat and lng must be given together".to_string(),
            )),
        }
    }

    fn time_filter(&self) -> Option<&str> {
        self.time
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// One entry of the search result list.
#[derive(Debug, Serialize)]
pub struct VenueCard<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub rating: f32,
    pub review_count: u32,
    pub price_per_hour: u32,
    pub image_url: &'a str,
    pub courts: u32,
    pub distance_km: Option<f64>,
    pub distance_label: String,
    pub slots: Vec<&'a TimeSlot>,
    pub more_slots: usize,
    pub has_availability: bool,
}

impl<'a> VenueCard<'a> {
    fn new(ranked: &RankedVenue<'a>, time_filter: Option<&str>) -> Self {
        let venue = ranked.venue;
        let preview = slot_preview(venue, time_filter);

        Self {
            id: &venue.id,
            name: &venue.name,
            address: &venue.address,
            coordinate: venue.coordinate,
            rating: venue.rating,
            review_count: venue.review_count,
            price_per_hour: venue.price_per_hour,
            image_url: &venue.image_url,
            courts: venue.courts,
            distance_km: ranked.distance_km,
            distance_label: format_distance(ranked.distance_km),
            slots: preview.slots,
            more_slots: preview.more,
            has_availability: preview.has_availability,
        }
    }
}

pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    params: Result<Query<VenuesQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let params = query_params(params)?;
    let observer = params.observer()?;
    let time_filter = params.time_filter();
    let query = params.query.as_deref().unwrap_or_default();
    let use_cache = state.config.features.enable_search_cache;

    let cache_key = search_cache_key(
        query,
        time_filter,
        observer.map(|c| (c.latitude, c.longitude)),
    );

    if use_cache {
        match state.cache.get_cached_search(&cache_key).await {
            Ok(Some(cached)) => return Ok(json_with_cache_status(cached, "HIT")),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "search cache read failed"),
        }
    }

    let criteria = SearchCriteria {
        query,
        time_filter,
        observer,
    };
    let cards: Vec<VenueCard> = rank_venues(state.catalog.venues(), &criteria)
        .iter()
        .map(|ranked| VenueCard::new(ranked, time_filter))
        .collect();

    let body = serde_json::to_string(&json!({
        "success": true,
        "venues": cards,
        "count": cards.len(),
        "sorted_by_distance": observer.is_some(),
    }))
    .map_err(|e| AppError::Internal(format!("failed to encode search result: {e}")))?;

    if use_cache {
        if let Err(e) = state
            .cache
            .cache_search_result(&cache_key, &body, state.config.cache.search_ttl_seconds)
            .await
        {
            warn!(error = %e, "failed to cache search result");
        }
    }

    Ok(json_with_cache_status(body, "MISS"))
}

fn json_with_cache_status(body: String, status: &'static str) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json"), (X_CACHE, status)],
        body,
    )
        .into_response()
}

fn find_detail<'a>(state: &'a AppState, id: &str) -> Result<&'a VenueDetail, AppError> {
    state
        .catalog
        .detail(id)
        .ok_or_else(|| AppError::not_found("venue"))
}

pub async fn venue_detail(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let venue = find_detail(&state, &path_param(id)?)?;
    Ok(Json(json!({ "success": true, "venue": venue })))
}

/// The caller's calendar date: the `today` it sends, else the server's.
fn caller_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: Option<NaiveDate>,
    pub slot: Option<String>,
    pub today: Option<NaiveDate>,
}

/// Schedule of one day plus the outcome of picking `slot` on it.
///
/// A slot that is booked or not offered that day leaves the selection empty
/// and is reported in `notice`; the request itself still succeeds.
pub async fn venue_schedule(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    params: Result<Query<ScheduleQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let params = query_params(params)?;
    let venue = find_detail(&state, &path_param(id)?)?;
    let today = caller_today(params.today);
    let date = params.date.unwrap_or(today);

    if !upcoming_dates(today, BOOKING_WINDOW_DAYS).contains(&date) {
        return Err(AppError::BadRequest(format!(
            "date must be one of the next {BOOKING_WINDOW_DAYS} days starting {today}"
        )));
    }

    let schedule = DaySchedule::for_date(venue, date);
    let mut selection = SlotSelection::new(date);
    let notice = params
        .slot
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .and_then(|label| selection.select_slot(venue, label).err())
        .map(|e| e.to_string());

    Ok(Json(json!({
        "success": true,
        "venue_id": venue.id,
        "schedule": schedule,
        "selection": {
            "date": selection.date(),
            "slot": selection.slot(),
            "bookable": selection.can_book(),
        },
        "notice": notice,
    })))
}

#[derive(Debug, Serialize)]
struct DateOption {
    date: NaiveDate,
    weekday: String,
    kind: DayKind,
    price: u32,
    available_count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct DatesQuery {
    pub today: Option<NaiveDate>,
}

pub async fn venue_dates(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    params: Result<Query<DatesQuery>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let params = query_params(params)?;
    let venue = find_detail(&state, &path_param(id)?)?;
    let today = caller_today(params.today);

    let dates: Vec<DateOption> = upcoming_dates(today, BOOKING_WINDOW_DAYS)
        .into_iter()
        .map(|date| {
            let schedule = DaySchedule::for_date(venue, date);
            DateOption {
                date,
                weekday: date.format("%a").to_string(),
                kind: schedule.kind,
                price: schedule.price,
                available_count: schedule.available_count,
            }
        })
        .collect();

    Ok(Json(json!({ "success": true, "venue_id": venue.id, "dates": dates })))
}

pub async fn time_slots() -> Json<Value> {
    Json(json!({ "success": true, "time_slots": time_filter_options() }))
}
