//! Session handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::application::auth::SESSION_COOKIE;

use super::{auth_to_api, json_to_api};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{Viewer, session_token};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

const LOGIN_ROUTE: &str = "login";

pub async fn login(
    State(state): State<ApiState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(json_to_api)?;

    let key = payload.email.trim().to_lowercase();
    let (allowed, _) = state.rate_limiter.allow(&key, LOGIN_ROUTE);
    if !allowed {
        return Ok(ApiError::rate_limited(state.rate_limiter.retry_after_secs()));
    }

    let issued = state
        .sessions
        .login(&payload.email, &payload.password)
        .await
        .map_err(auth_to_api)?;

    let cookie = Cookie::build((SESSION_COOKIE, issued.token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(state.secure_cookie)
        .expires(issued.expires_at);

    let body = LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        author: session_author(&issued.identity),
    };

    Ok((jar.add(cookie), Json(body)).into_response())
}

/// Revoke the presented session, if any, and clear the cookie.
pub async fn logout(
    State(state): State<ApiState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session_token(&headers) {
        state.sessions.logout(&token).await.map_err(auth_to_api)?;
    }

    let removal = Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(state.secure_cookie)
        .max_age(time::Duration::ZERO);
    Ok((jar.add(removal), StatusCode::NO_CONTENT))
}

pub async fn current_session(Viewer(viewer): Viewer) -> Json<SessionResponse> {
    Json(SessionResponse {
        author: viewer.as_ref().map(session_author),
    })
}
