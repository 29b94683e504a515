//! Shared fixtures for the HTTP-level integration tests.

#![allow(dead_code)]

use std::{env::VarError, net::IpAddr, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use futures::future::BoxFuture;
use serde_json::Value;
use tower::ServiceExt;

use futsal_finder::{
    cache::CacheService,
    catalog::Catalog,
    config::Config,
    models::Coordinate,
    repository::MemoryVenueRepository,
    router,
    services::{
        auth::AuthService,
        geolocation::{default_observer, GeolocationError, LocationProvider},
    },
    AppState,
};

pub const ADMIN_PASSWORD: &str = "kickoff-2026";

/// Provider that answers instantly with a fixed coordinate, or fails.
pub struct FixedLocation(pub Option<Coordinate>);

impl LocationProvider for FixedLocation {
    fn locate(&self, _ip: Option<IpAddr>) -> BoxFuture<'_, Result<Coordinate, GeolocationError>> {
        let result = self.0.ok_or(GeolocationError::Lookup {
            query: "caller".to_string(),
            message: "reserved range".to_string(),
        });
        Box::pin(async move { result })
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let overrides: Vec<(String, String)> = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Config::from_lookup(move |key| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| k == key) {
            return Ok(value.clone());
        }
        match key {
            "ENVIRONMENT" => Ok("test".to_string()),
            "JWT_SECRET" => Ok("integration-test-secret".to_string()),
            "GEOLOCATION_TIMEOUT_SECONDS" => Ok("1".to_string()),
            _ => Err(VarError::NotPresent),
        }
    })
    .expect("test config")
}

pub fn test_state(config: Config, locator: Arc<dyn LocationProvider>) -> Arc<AppState> {
    let hash = bcrypt::hash(ADMIN_PASSWORD, 4).expect("hash admin password");

    Arc::new(AppState {
        default_observer: default_observer(&config.geolocation),
        auth: AuthService::new(&config.jwt.secret, Some(hash), config.jwt.expires_in_hours),
        catalog: Arc::new(Catalog::builtin().expect("built-in catalog")),
        venues: Arc::new(MemoryVenueRepository::new()),
        cache: CacheService::in_memory(),
        locator,
        config,
    })
}

pub fn test_app() -> Router {
    router(test_state(test_config(&[]), Arc::new(FixedLocation(None))))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    send(app, request).await
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

pub async fn authed(app: &Router, method: Method, uri: &str, token: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    send(app, request).await
}

pub fn venue_form(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "address": "Jhamsikhel, Lalitpur",
        "google_plus_code": "7MR8+Q4 Lalitpur",
        "weekday_price": 1600,
        "weekend_price": 2100,
        "court_types": ["5A", "7A"],
        "contact": "+977 9812345678",
        "description": "Floodlit turf",
    })
}
