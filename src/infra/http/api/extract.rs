//! Session extraction for API handlers.
//!
//! A token is read from `Authorization: Bearer <token>` first and from the
//! session cookie otherwise.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::application::auth::{AuthError, Identity, SESSION_COOKIE};
use crate::infra::http::RequestContext;

use super::error::ApiError;
use super::handlers::auth_to_api;
use super::state::ApiState;

/// Present in a handler's arguments to require a valid session.
#[derive(Debug, Clone)]
pub struct AuthenticatedAuthor(pub Identity);

/// Optional identity: anonymous readers and stale tokens resolve to `None`.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<Identity>);

impl<S> FromRequestParts<S> for AuthenticatedAuthor
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api = ApiState::from_ref(state);
        let token = session_token(&parts.headers);
        let identity = api
            .sessions
            .identify(token.as_deref())
            .await
            .map_err(auth_to_api)?;
        record_author(parts, &identity);
        Ok(Self(identity))
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let api = ApiState::from_ref(state);
        let token = session_token(&parts.headers);
        match api.sessions.identify(token.as_deref()).await {
            Ok(identity) => {
                record_author(parts, &identity);
                Ok(Self(Some(identity)))
            }
            Err(AuthError::Repo(err)) => Err(auth_to_api(AuthError::Repo(err))),
            Err(_) => Ok(Self(None)),
        }
    }
}

fn record_author(parts: &Parts, identity: &Identity) {
    if let Some(ctx) = parts.extensions.get::<RequestContext>() {
        ctx.record_author(identity.author_id);
    }
}

pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let bearer = raw.strip_prefix("Bearer ")?.trim();
    (!bearer.is_empty()).then(|| bearer.to_string())
}
