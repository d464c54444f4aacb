use std::sync::Arc;

use crate::application::auth::SessionService;
use crate::application::posts::PostService;

use super::rate_limit::ApiRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub sessions: Arc<SessionService>,
    pub rate_limiter: Arc<ApiRateLimiter>,
    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,
}
