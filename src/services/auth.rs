//! Admin sessions: password check against a bcrypt hash and HS256 bearer tokens.
//!
//! Two kinds of principal exist. The site administrator logs in with the
//! configured password and may manage every listing. A venue owner receives a
//! session when registering a venue and may only manage that one listing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{AdminConfig, JwtConfig};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or malformed token")]
    InvalidToken,

    #[error("session expired")]
    Expired,

    #[error("session has been logged out")]
    Revoked,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("admin login is not configured")]
    NotConfigured,

    #[error("not allowed to manage this venue")]
    Forbidden,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Principal {
    Admin,
    Owner { venue_id: Uuid },
}

impl Principal {
    pub fn can_manage(&self, venue_id: Uuid) -> bool {
        match self {
            Principal::Admin => true,
            Principal::Owner { venue_id: own } => *own == venue_id,
        }
    }

    pub fn can_create(&self) -> bool {
        matches!(self, Principal::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub principal: Principal,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
    pub principal: Principal,
}

#[derive(Clone)]
pub struct AuthService {
    password_hash: Option<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &str, password_hash: Option<String>, ttl_hours: i64) -> Self {
        Self {
            password_hash,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn from_config(jwt: &JwtConfig, admin: &AdminConfig) -> Result<Self, AuthError> {
        let password_hash = match (&admin.password_hash, &admin.password) {
            (Some(hash), _) => Some(hash.clone()),
            (None, Some(plain)) => {
                tracing::warn!("ADMIN_PASSWORD is set in plain text; prefer ADMIN_PASSWORD_HASH");
                Some(hash_password(plain)?)
            }
            (None, None) => {
                tracing::warn!("no admin password configured; admin login disabled");
                None
            }
        };
        Ok(Self::new(&jwt.secret, password_hash, jwt.expires_in_hours))
    }

    /// Checks the admin password off the async runtime.
    pub async fn verify_admin_password(&self, password: &str) -> Result<(), AuthError> {
        let hash = self.password_hash.clone().ok_or(AuthError::NotConfigured)?;
        let password = password.to_string();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if matches {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn issue(&self, principal: Principal) -> Result<IssuedSession, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let sub = match principal {
            Principal::Admin => "admin".to_string(),
            Principal::Owner { venue_id } => format!("owner:{venue_id}"),
        };
        let claims = Claims {
            sub,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            principal,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(IssuedSession {
            token,
            token_type: "Bearer",
            expires_at,
            principal,
        })
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }
}

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}
