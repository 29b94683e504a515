//! Observer location lookup with a fixed timeout and a default fallback.
//!
//! One attempt per request, no retry. Any failure (provider error, timeout,
//! open circuit) resolves to the configured default location plus an
//! informational status string; callers never see an error.

use std::{net::IpAddr, time::Duration};

use failsafe::{
    backoff::{self, Constant},
    failure_policy::{consecutive_failures, ConsecutiveFailures},
    futures::CircuitBreaker as _,
    StateMachine,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{CircuitBreakerConfig, GeolocationConfig},
    models::{Coordinate, ObserverLocation},
};

pub const CURRENT_LOCATION_LABEL: &str = "Current Location";
pub const DEFAULT_LOCATION_STATUS: &str = "Using default location";

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("location request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider could not locate {query}: {message}")]
    Lookup { query: String, message: String },

    #[error("location provider temporarily disabled after repeated failures")]
    CircuitOpen,
}

/// Anything that can turn a client address into a coordinate.
pub trait LocationProvider: Send + Sync {
    fn locate(&self, ip: Option<IpAddr>) -> BoxFuture<'_, Result<Coordinate, GeolocationError>>;
}

type Breaker = StateMachine<ConsecutiveFailures<Constant>, ()>;

/// IP geolocation over HTTP, speaking the ip-api.com JSON format.
#[derive(Clone)]
pub struct HttpLocationProvider {
    client: reqwest::Client,
    base_url: String,
    breaker: Breaker,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl HttpLocationProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        breaker_config: &CircuitBreakerConfig,
    ) -> Self {
        let policy = consecutive_failures(
            breaker_config.failure_threshold,
            backoff::constant(Duration::from_secs(breaker_config.timeout_seconds)),
        );
        let breaker = failsafe::Config::new().failure_policy(policy).build();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            breaker,
        }
    }

    pub fn from_config(
        geolocation: &GeolocationConfig,
        breaker_config: &CircuitBreakerConfig,
    ) -> Result<Self, GeolocationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(geolocation.timeout_seconds))
            .build()?;
        Ok(Self::new(client, &geolocation.provider_url, breaker_config))
    }

    async fn lookup(&self, ip: Option<IpAddr>) -> Result<Coordinate, GeolocationError> {
        let url = match ip {
            Some(ip) => format!("{}/{}", self.base_url, ip),
            None => self.base_url.clone(),
        };

        let body: IpApiResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let query = ip.map_or_else(|| "caller".to_string(), |ip| ip.to_string());
        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(GeolocationError::Lookup {
                query,
                message: body.message.unwrap_or(body.status),
            }),
        }
    }
}

impl LocationProvider for HttpLocationProvider {
    fn locate(&self, ip: Option<IpAddr>) -> BoxFuture<'_, Result<Coordinate, GeolocationError>> {
        Box::pin(async move {
            match self.breaker.call(self.lookup(ip)).await {
                Ok(coordinate) => Ok(coordinate),
                Err(failsafe::Error::Inner(e)) => Err(e),
                Err(failsafe::Error::Rejected) => Err(GeolocationError::CircuitOpen),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Provider,
    Default,
}

/// Outcome of a location lookup, always usable as a ranking origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub observer: ObserverLocation,
    pub source: LocationSource,
    /// Informational message for the user, set when the default was used.
    pub status: Option<String>,
}

pub fn default_observer(config: &GeolocationConfig) -> ObserverLocation {
    ObserverLocation::new(
        Coordinate::new(config.default_latitude, config.default_longitude),
        config.default_label.clone(),
    )
}

pub async fn resolve_observer(
    provider: &dyn LocationProvider,
    ip: Option<IpAddr>,
    timeout: Duration,
    fallback: &ObserverLocation,
) -> ResolvedLocation {
    let outcome = tokio::time::timeout(timeout, provider.locate(ip)).await;

    match outcome {
        Ok(Ok(coordinate)) => ResolvedLocation {
            observer: ObserverLocation::new(coordinate, CURRENT_LOCATION_LABEL),
            source: LocationSource::Provider,
            status: None,
        },
        Ok(Err(e)) => {
            info!(error = %e, "geolocation failed, using default location");
            fallback_location(fallback)
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "geolocation timed out, using default location");
            fallback_location(fallback)
        }
    }
}

fn fallback_location(fallback: &ObserverLocation) -> ResolvedLocation {
    ResolvedLocation {
        observer: fallback.clone(),
        source: LocationSource::Default,
        status: Some(DEFAULT_LOCATION_STATUS.to_string()),
    }
}
