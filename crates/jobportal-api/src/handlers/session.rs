//! Session cookie issue and logout.

use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::auth::{removal_cookie, session_cookie, SessionRequest};
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::metrics::record_session_issued;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionAck {
    pub success: bool,
}

/// POST /jwt
///
/// Sign the submitted identity and set it as the `token` cookie.
pub async fn issue_session(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(identity): JsonBody<SessionRequest>,
) -> ApiResult<(CookieJar, Json<SessionAck>)> {
    identity
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let email = identity.email.clone();
    let token = state.sessions.issue(identity)?;
    record_session_issued();
    info!("Issued session for {}", email);

    let jar = jar.add(session_cookie(token, state.config.is_production()));
    Ok((jar, Json(SessionAck { success: true })))
}

/// POST /jwt/logout
///
/// Clear the session cookie. The body, if any, is ignored.
///
/// The expired cookie is sent even when the request carried none.
pub async fn end_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionAck>) {
    let jar = jar.add(removal_cookie(state.config.is_production()));
    (jar, Json(SessionAck { success: true }))
}
