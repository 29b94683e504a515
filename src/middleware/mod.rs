use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::{net::IpAddr, sync::Arc};
use uuid::Uuid;

use crate::{
    error::AppError,
    services::auth::{AuthError, Claims, Principal},
    AppState,
};

/// An authenticated admin or venue-owner session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: Claims,
}

impl AdminSession {
    pub fn principal(&self) -> Principal {
        self.claims.principal
    }

    pub fn ensure_can_manage(&self, venue_id: Uuid) -> Result<(), AppError> {
        if self.principal().can_manage(venue_id) {
            Ok(())
        } else {
            Err(AuthError::Forbidden.into())
        }
    }

    pub fn ensure_can_create(&self) -> Result<(), AppError> {
        if self.principal().can_create() {
            Ok(())
        } else {
            Err(AuthError::Forbidden.into())
        }
    }
}

// Bearer token extractor
impl FromRequestParts<Arc<AppState>> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = state.auth.decode(token)?;

        match state.cache.is_session_revoked(&claims.jti).await {
            Ok(true) => return Err(AuthError::Revoked.into()),
            Ok(false) => {}
            // cache outage must not lock every admin out
            Err(e) => tracing::warn!(error = %e, "could not check session revocation"),
        }

        Ok(AdminSession { claims })
    }
}

/// Best-effort client address from proxy headers.
pub fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());
    let real_ip = headers.get("x-real-ip").and_then(|v| v.to_str().ok());

    forwarded
        .into_iter()
        .chain(real_ip)
        .find_map(|candidate| candidate.trim().parse().ok())
}
