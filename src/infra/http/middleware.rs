use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

/// Per-request bookkeeping shared between the layers and the session
/// extractors. Clones share the author slot.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub request_id: String,
    author: Arc<OnceLock<Uuid>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            author: Arc::new(OnceLock::new()),
        }
    }

    /// First identity wins; later calls are ignored.
    pub fn record_author(&self, author_id: Uuid) {
        let _ = self.author.set(author_id);
    }

    pub fn author_id(&self) -> Option<Uuid> {
        self.author.get().copied()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::new();
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Log every 4xx/5xx together with the [`ErrorReport`] the handler attached.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let ctx = request.extensions().get::<RequestContext>().cloned();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let request_id = ctx
            .as_ref()
            .map(|ctx| ctx.request_id.as_str())
            .unwrap_or_default();
        let author_id = ctx
            .as_ref()
            .and_then(RequestContext::author_id)
            .map(|id| id.to_string())
            .unwrap_or_default();
        let elapsed_ms = start.elapsed().as_millis();
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "quillpost::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                author_id = %author_id,
                "request failed",
            );
        } else {
            warn!(
                target = "quillpost::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = request_id,
                author_id = %author_id,
                "client request error",
            );
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_author_slot() {
        let ctx = RequestContext::new();
        let seen_by_extractor = ctx.clone();
        assert_eq!(ctx.author_id(), None);

        let first = Uuid::new_v4();
        seen_by_extractor.record_author(first);
        seen_by_extractor.record_author(Uuid::new_v4());

        assert_eq!(ctx.author_id(), Some(first));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestContext::new().request_id, RequestContext::new().request_id);
    }
}
