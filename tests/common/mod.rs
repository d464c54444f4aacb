//! In-memory repository fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, LazyLock};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::Router;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use uuid::Uuid;

use quillpost::application::auth::{SessionService, hash_password};
use quillpost::application::posts::PostService;
use quillpost::application::render::MarkdownRenderer;
use quillpost::application::repos::{
    AUTHORS_EMAIL_CONSTRAINT, AuthorsRepo, CreateAuthorParams, CreatePostParams,
    CreateSessionParams, HealthRepo, POSTS_SLUG_CONSTRAINT, PostListFilter, PostsRepo,
    PostsWriteRepo, RepoError, SessionsRepo, UpdatePostParams,
};
use quillpost::domain::entities::{AuthorRecord, PostRecord, PostWithAuthor, SessionRecord};
use quillpost::infra::http::{self, ApiRateLimiter, ApiState, HttpState, RouterState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

static ADMIN_PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(ADMIN_PASSWORD).expect("hash admin password"));

#[derive(Default)]
struct StoreState {
    posts: Vec<PostRecord>,
    authors: Vec<AuthorRecord>,
    sessions: Vec<SessionRecord>,
    ticks: i64,
    unhealthy: bool,
}

impl StoreState {
    /// Strictly increasing timestamps keep newest-first ordering deterministic.
    fn tick(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        OffsetDateTime::UNIX_EPOCH + Duration::days(20_000) + Duration::seconds(self.ticks)
    }

    fn with_author(&self, post: &PostRecord) -> Result<PostWithAuthor, RepoError> {
        let author = self
            .authors
            .iter()
            .find(|author| author.id == post.author_id)
            .ok_or_else(|| RepoError::InvalidInput {
                message: "post references a missing author".into(),
            })?;
        Ok(PostWithAuthor {
            post: post.clone(),
            author: author.summary(),
        })
    }

    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.posts
            .iter()
            .any(|post| post.slug == slug && Some(post.id) != except)
    }
}

/// One fake standing in for every repository trait, mirroring the
/// uniqueness constraints of the real schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn post_count(&self) -> usize {
        self.state.lock().await.posts.len()
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn stored_post(&self, id: Uuid) -> Option<PostRecord> {
        self.state
            .lock()
            .await
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned()
    }

    /// Push every session's expiry into the past.
    pub async fn expire_sessions(&self) {
        let mut state = self.state.lock().await;
        let past = OffsetDateTime::now_utc() - Duration::minutes(1);
        for session in &mut state.sessions {
            session.expires_at = past;
        }
    }

    pub async fn set_unhealthy(&self, unhealthy: bool) {
        self.state.lock().await.unhealthy = unhealthy;
    }

    /// Insert an author whose password is [`ADMIN_PASSWORD`].
    pub async fn seed_author(&self, name: &str, email: &str) -> AuthorRecord {
        self.create_author(CreateAuthorParams {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: ADMIN_PASSWORD_HASH.clone(),
        })
        .await
        .expect("seed author")
    }
}

#[async_trait]
impl PostsRepo for MemoryStore {
    async fn list_posts(&self, filter: PostListFilter) -> Result<Vec<PostWithAuthor>, RepoError> {
        let state = self.state.lock().await;
        let mut posts = state
            .posts
            .iter()
            .filter(|post| !filter.published_only || post.published)
            .map(|post| state.with_author(post))
            .collect::<Result<Vec<_>, _>>()?;
        posts.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then_with(|| b.post.id.cmp(&a.post.id))
        });
        Ok(posts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let state = self.state.lock().await;
        state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|post| state.with_author(post))
            .transpose()
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        published_only: bool,
    ) -> Result<Option<PostWithAuthor>, RepoError> {
        let state = self.state.lock().await;
        state
            .posts
            .iter()
            .find(|post| post.slug == slug && (!published_only || post.published))
            .map(|post| state.with_author(post))
            .transpose()
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        if state.slug_taken(&params.slug, None) {
            return Err(RepoError::Duplicate {
                constraint: POSTS_SLUG_CONSTRAINT.to_string(),
            });
        }
        let now = state.tick();
        let post = PostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            slug: params.slug,
            content: params.content,
            excerpt: params.excerpt,
            published: params.published,
            tags: params.tags,
            featured_image: params.featured_image,
            author_id: params.author_id,
            created_at: now,
            updated_at: now,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut state = self.state.lock().await;
        if !state.posts.iter().any(|post| post.id == params.id) {
            return Err(RepoError::NotFound);
        }
        let slug_conflict = params
            .slug
            .as_deref()
            .is_some_and(|slug| state.slug_taken(slug, Some(params.id)));
        if slug_conflict {
            return Err(RepoError::Duplicate {
                constraint: POSTS_SLUG_CONSTRAINT.to_string(),
            });
        }
        let now = state.tick();
        let post = state
            .posts
            .iter_mut()
            .find(|post| post.id == params.id)
            .ok_or(RepoError::NotFound)?;

        if let Some(title) = params.title {
            post.title = title;
        }
        if let Some(slug) = params.slug {
            post.slug = slug;
        }
        if let Some(content) = params.content {
            post.content = content;
        }
        if let Some(excerpt) = params.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(published) = params.published {
            post.published = published;
        }
        if let Some(tags) = params.tags {
            post.tags = tags;
        }
        if let Some(featured_image) = params.featured_image {
            post.featured_image = featured_image;
        }
        post.updated_at = now;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        let before = state.posts.len();
        state.posts.retain(|post| post.id != id);
        if state.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthorsRepo for MemoryStore {
    async fn find_author_by_email(&self, email: &str) -> Result<Option<AuthorRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .authors
            .iter()
            .find(|author| author.email == email)
            .cloned())
    }

    async fn find_author_by_id(&self, id: Uuid) -> Result<Option<AuthorRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.authors.iter().find(|author| author.id == id).cloned())
    }

    async fn create_author(&self, params: CreateAuthorParams) -> Result<AuthorRecord, RepoError> {
        let mut state = self.state.lock().await;
        if state.authors.iter().any(|author| author.email == params.email) {
            return Err(RepoError::Duplicate {
                constraint: AUTHORS_EMAIL_CONSTRAINT.to_string(),
            });
        }
        let created_at = state.tick();
        let author = AuthorRecord {
            id: Uuid::new_v4(),
            name: params.name,
            email: params.email,
            password_hash: params.password_hash,
            created_at,
        };
        state.authors.push(author.clone());
        Ok(author)
    }
}

#[async_trait]
impl SessionsRepo for MemoryStore {
    async fn create_session(
        &self,
        params: CreateSessionParams,
    ) -> Result<SessionRecord, RepoError> {
        let mut state = self.state.lock().await;
        let session = SessionRecord {
            id: Uuid::new_v4(),
            author_id: params.author_id,
            prefix: params.prefix,
            hashed_secret: params.hashed_secret,
            expires_at: params.expires_at,
            created_at: OffsetDateTime::now_utc(),
        };
        state.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<SessionRecord>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .find(|session| session.prefix == prefix)
            .cloned())
    }

    async fn delete_session_by_prefix(&self, prefix: &str) -> Result<(), RepoError> {
        let mut state = self.state.lock().await;
        state.sessions.retain(|session| session.prefix != prefix);
        Ok(())
    }

    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> Result<u64, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|session| session.expires_at > now);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl HealthRepo for MemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        if self.state.lock().await.unhealthy {
            return Err(RepoError::Timeout);
        }
        Ok(())
    }
}

pub fn post_service(store: &MemoryStore) -> PostService {
    PostService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(MarkdownRenderer::sanitizing()),
    )
}

pub fn session_service(store: &MemoryStore) -> SessionService {
    SessionService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Duration::hours(1),
    )
}

pub fn router_state(store: &MemoryStore, max_login_attempts: u32) -> RouterState {
    let posts = Arc::new(post_service(store));
    RouterState {
        http: HttpState {
            posts: posts.clone(),
            health: Arc::new(store.clone()),
        },
        api: ApiState {
            posts,
            sessions: Arc::new(session_service(store)),
            rate_limiter: Arc::new(ApiRateLimiter::new(
                StdDuration::from_secs(60),
                max_login_attempts,
            )),
            secure_cookie: false,
        },
    }
}

pub fn app(store: &MemoryStore) -> Router {
    http::build_app(router_state(store, 10))
}
