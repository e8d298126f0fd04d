//! Session token authentication.
//!
//! `POST /jwt` signs the submitted identity into an HS256 token stored in the
//! `token` cookie. Protected handlers take a [`SessionUser`], which rejects
//! requests without a valid cookie.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Registered claims we set ourselves; client copies are dropped.
const MANAGED_CLAIMS: &[&str] = &["iat", "exp", "nbf"];

/// Identity submitted to `POST /jwt`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionRequest {
    #[validate(email)]
    pub email: String,

    /// Any other identity fields (name, photo URL, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiration (seconds since epoch)
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign a token for the submitted identity.
    pub fn issue(&self, request: SessionRequest) -> ApiResult<String> {
        let mut extra = request.extra;
        for claim in MANAGED_CLAIMS {
            extra.remove(*claim);
        }

        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            email: request.email,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
            extra,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify signature and expiry.
    pub fn verify(&self, token: &str) -> ApiResult<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Session token rejected: {}", e);
                ApiError::unauthorized("invalid session token")
            })
    }
}

/// Session cookie for a freshly issued token.
pub fn session_cookie(token: String, production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    apply_attributes(&mut cookie, production);
    cookie
}

/// Expired cookie that clears the session; attributes match the issued one.
pub fn removal_cookie(production: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    apply_attributes(&mut cookie, production);
    cookie.make_removal();
    cookie
}

fn apply_attributes(cookie: &mut Cookie<'static>, production: bool) {
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie.set_secure(production);
    cookie.set_same_site(if production {
        SameSite::None
    } else {
        SameSite::Strict
    });
}

/// Authenticated session extracted from the `token` cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub email: String,
    pub claims: SessionClaims,
}

impl SessionUser {
    /// Only the session's own identity may be read.
    pub fn require_email(&self, requested: Option<&str>) -> ApiResult<()> {
        match requested {
            Some(email) if email == self.email => Ok(()),
            _ => Err(ApiError::forbidden("email does not match session")),
        }
    }
}

/// Axum extractor for the session user.
#[axum::async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("missing session token"))?;

        let claims = state.sessions.verify(token)?;

        Ok(SessionUser {
            email: claims.email.clone(),
            claims,
        })
    }
}
