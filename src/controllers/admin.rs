use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{json_body, path_param};
use crate::{
    error::AppError,
    middleware::AdminSession,
    models::{AdminVenue, CourtType, VenueFields, VenueInput},
    services::{
        auth::Principal,
        images::{ensure_renderable, to_data_uri},
    },
    AppState,
};

// Room for a maximum-size photo as a base64 data URI inside a JSON form.
const ADMIN_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_venue))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/venues", get(list_venues).post(create_venue))
        .route(
            "/venues/{id}",
            get(get_venue).put(update_venue).delete(delete_venue),
        )
        .route("/stats", get(venue_stats))
        .route("/photos", post(upload_photo))
        .layer(DefaultBodyLimit::max(ADMIN_BODY_LIMIT))
}

fn validated_fields(input: VenueInput) -> Result<VenueFields, AppError> {
    let fields = input.into_fields().map_err(|_| AppError::missing_fields())?;
    if let Some(photo) = &fields.photo {
        ensure_renderable(photo)?;
    }
    Ok(fields)
}

/// Public registration: creates the listing and signs the owner in.
pub async fn register_venue(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VenueInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let fields = validated_fields(json_body(payload)?)?;

    let venue = state.venues.create(fields).await?;
    let session = state.auth.issue(Principal::Owner { venue_id: venue.id })?;
    info!(venue_id = %venue.id, name = %venue.fields.name, "venue registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "venue": venue, "session": session })),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let request = json_body(payload)?;
    request.validate().map_err(|_| AppError::missing_fields())?;

    if let Err(e) = state.auth.verify_admin_password(&request.password).await {
        warn!(error = %e, "admin login rejected");
        return Err(e.into());
    }

    let session = state.auth.issue(Principal::Admin)?;
    info!("admin logged in");
    Ok(Json(json!({ "success": true, "session": session })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> Result<Json<Value>, AppError> {
    let remaining = session.claims.exp.saturating_sub(Utc::now().timestamp()).max(1);

    state
        .cache
        .revoke_session(&session.claims.jti, remaining.unsigned_abs())
        .await
        .map_err(|e| AppError::Internal(format!("failed to revoke session: {e}")))?;

    Ok(Json(json!({ "success": true })))
}

async fn visible_venues(
    state: &AppState,
    principal: Principal,
) -> Result<Vec<AdminVenue>, AppError> {
    let venues = state.venues.list().await?;
    Ok(venues
        .into_iter()
        .filter(|venue| principal.can_manage(venue.id))
        .collect())
}

pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> Result<Json<Value>, AppError> {
    let venues = visible_venues(&state, session.principal()).await?;
    Ok(Json(json!({
        "success": true,
        "count": venues.len(),
        "venues": venues,
    })))
}

pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    payload: Result<Json<VenueInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    session.ensure_can_create()?;
    let fields = validated_fields(json_body(payload)?)?;

    let venue = state.venues.create(fields).await?;
    info!(venue_id = %venue.id, "venue created by admin");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "venue": venue })),
    ))
}

pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let id = path_param(id)?;
    session.ensure_can_manage(id)?;
    let venue = state.venues.get(id).await?;
    Ok(Json(json!({ "success": true, "venue": venue })))
}

pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<VenueInput>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = path_param(id)?;
    session.ensure_can_manage(id)?;
    let fields = validated_fields(json_body(payload)?)?;

    let venue = state.venues.update(id, fields).await?;
    info!(venue_id = %id, "venue updated");
    Ok(Json(json!({ "success": true, "venue": venue })))
}

pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let id = path_param(id)?;
    session.ensure_can_manage(id)?;
    state.venues.delete(id).await?;
    info!(venue_id = %id, "venue deleted");
    Ok(Json(json!({ "success": true })))
}

pub async fn venue_stats(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> Result<Json<Value>, AppError> {
    let venues = visible_venues(&state, session.principal()).await?;
    let offering = |court_type: CourtType| venues.iter().filter(|v| v.offers(court_type)).count();

    Ok(Json(json!({
        "success": true,
        "stats": {
            "total_venues": venues.len(),
            "five_a_side": offering(CourtType::FiveASide),
            "seven_a_side": offering(CourtType::SevenASide),
        },
    })))
}

/// Converts a raw image body into a data URI usable as a venue photo.
pub async fn upload_photo(
    _session: AdminSession,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Content-Type header is required".to_string()))?;

    let photo = to_data_uri(content_type, &body)?;
    Ok(Json(json!({
        "success": true,
        "photo": photo,
        "size": body.len(),
    })))
}
