//! Session issuance and lookup: the gate in front of every post mutation.
//!
//! Tokens have the shape `qp_<prefix>_<secret>`. The prefix is stored in the
//! clear and used as the lookup key; only the SHA-256 digest of the secret is
//! persisted and it is compared in constant time.

use std::sync::{Arc, LazyLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::repos::{AuthorsRepo, CreateSessionParams, RepoError, SessionsRepo};
use crate::domain::entities::{AuthorRecord, AuthorSummary};
use crate::infra::telemetry::LOGIN_FAILURES_TOTAL;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "quillpost_session";

const TOKEN_PREFIX: &str = "qp";
const MIN_SECRET_LEN: usize = 32;

/// Unknown emails are checked against this hash so every rejected login pays
/// for one Argon2 verification.
static DECOY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("quillpost decoy credential").unwrap_or_default());

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing session token")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("expired session")]
    Expired,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// The authenticated author behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub author_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

impl From<&AuthorRecord> for Identity {
    fn from(author: &AuthorRecord) -> Self {
        Self {
            author_id: author.id,
            name: author.name.clone(),
            email: author.email.clone(),
        }
    }
}

/// Result of a successful login. The token is only ever returned here.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub identity: Identity,
}

/// Checks a password against a stored PHC string. Called on the blocking pool.
pub trait PasswordCheck: Send + Sync {
    fn verify(&self, hash: &str, password: &str) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Check;

impl PasswordCheck for Argon2Check {
    fn verify(&self, hash: &str, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[derive(Clone)]
pub struct SessionService {
    authors: Arc<dyn AuthorsRepo>,
    sessions: Arc<dyn SessionsRepo>,
    passwords: Arc<dyn PasswordCheck>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(authors: Arc<dyn AuthorsRepo>, sessions: Arc<dyn SessionsRepo>, ttl: Duration) -> Self {
        Self {
            authors,
            sessions,
            passwords: Arc::new(Argon2Check),
            ttl,
        }
    }

    pub fn with_password_check(mut self, passwords: Arc<dyn PasswordCheck>) -> Self {
        self.passwords = passwords;
        self
    }

    /// Verify credentials and open a new session.
    ///
    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let email = email.trim();
        let author = self.authors.find_author_by_email(email).await?;
        let stored_hash = author.as_ref().map(|author| author.password_hash.clone());
        let password_matches = self.check_password(stored_hash, password).await?;

        let Some(author) = author else {
            metrics::counter!(LOGIN_FAILURES_TOTAL, "reason" => "unknown_email").increment(1);
            warn!(target = "quillpost::auth", "login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !password_matches {
            metrics::counter!(LOGIN_FAILURES_TOTAL, "reason" => "bad_password").increment(1);
            warn!(
                target = "quillpost::auth",
                author_id = %author.id,
                "login rejected: password mismatch"
            );
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.issue(&author).await?;
        info!(
            target = "quillpost::auth",
            author_id = %author.id,
            expires_at = %issued.expires_at,
            "session issued"
        );
        Ok(issued)
    }

    /// `None` is checked against [`DECOY_HASH`]; the caller rejects it regardless.
    async fn check_password(&self, hash: Option<String>, password: &str) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let hash = hash.as_deref().unwrap_or(DECOY_HASH.as_str());
            passwords.verify(hash, &password)
        })
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))
    }

    async fn issue(&self, author: &AuthorRecord) -> Result<IssuedSession, AuthError> {
        let now = OffsetDateTime::now_utc();
        let swept = self.sessions.delete_expired_sessions(now).await?;
        if swept > 0 {
            debug!(target = "quillpost::auth", swept, "expired sessions removed");
        }

        let prefix = generate_prefix();
        let secret = generate_secret();
        let token = format!("{TOKEN_PREFIX}_{prefix}_{secret}");
        let expires_at = now + self.ttl;

        self.sessions
            .create_session(CreateSessionParams {
                author_id: author.id,
                prefix,
                hashed_secret: hash_secret(&secret),
                expires_at,
            })
            .await?;

        Ok(IssuedSession {
            token,
            expires_at,
            identity: Identity::from(author),
        })
    }

    /// Resolve a presented token into the author it belongs to.
    pub async fn identify(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or(AuthError::Missing)?;
        let parsed = parse_token(token).ok_or(AuthError::Invalid)?;

        let session = self
            .sessions
            .find_session_by_prefix(&parsed.prefix)
            .await?
            .ok_or(AuthError::Invalid)?;

        let hashed_input = hash_secret(&parsed.secret);
        if session.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AuthError::Invalid);
        }

        if session.expires_at <= OffsetDateTime::now_utc() {
            self.sessions.delete_session_by_prefix(&parsed.prefix).await?;
            return Err(AuthError::Expired);
        }

        let author = self
            .authors
            .find_author_by_id(session.author_id)
            .await?
            .ok_or(AuthError::Invalid)?;

        Ok(Identity::from(&author))
    }

    /// Drop the session behind `token`. Unknown or malformed tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let Some(parsed) = parse_token(token) else {
            return Ok(());
        };
        let Some(session) = self.sessions.find_session_by_prefix(&parsed.prefix).await? else {
            return Ok(());
        };
        if session.hashed_secret.ct_eq(&hash_secret(&parsed.secret)).unwrap_u8() == 0 {
            return Ok(());
        }

        self.sessions.delete_session_by_prefix(&parsed.prefix).await?;
        info!(
            target = "quillpost::auth",
            author_id = %session.author_id,
            "session revoked"
        );
        Ok(())
    }
}

/// Produce an Argon2id PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| AuthError::Hashing(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| AuthError::Hashing(err.to_string()))?
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}

fn generate_prefix() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

fn generate_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedToken {
    prefix: String,
    secret: String,
}

fn parse_token(token: &str) -> Option<ParsedToken> {
    let mut parts = token.trim().splitn(3, '_');
    if parts.next()? != TOKEN_PREFIX {
        return None;
    }
    let prefix = parts.next()?;
    let secret = parts.next()?;
    if prefix.is_empty() || secret.len() < MIN_SECRET_LEN {
        return None;
    }
    Some(ParsedToken {
        prefix: prefix.to_string(),
        secret: secret.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_token_accepts_issued_shape() {
        let secret = generate_secret();
        let token = format!("qp_{}_{}", "abc123def456", secret);
        assert_eq!(
            parse_token(&token),
            Some(ParsedToken {
                prefix: "abc123def456".into(),
                secret,
            })
        );
    }

    #[test]
    fn parse_token_rejects_malformed_input() {
        assert_eq!(parse_token(""), None);
        assert_eq!(parse_token("qp_onlyprefix"), None);
        assert_eq!(parse_token("sk_abc_0123456789abcdef0123456789abcdef"), None);
        assert_eq!(parse_token("qp__0123456789abcdef0123456789abcdef"), None);
        assert_eq!(parse_token("qp_abc_short"), None);
    }

    #[test]
    fn generated_parts_have_expected_lengths() {
        assert_eq!(generate_prefix().len(), 12);
        assert_eq!(generate_secret().len(), 64);
        assert!(!generate_prefix().contains('_'));
    }

    #[test]
    fn secret_hash_is_stable_sha256() {
        assert_eq!(hash_secret("abc"), hash_secret("abc"));
        assert_eq!(hash_secret("abc").len(), 32);
        assert_ne!(hash_secret("abc"), hash_secret("abd"));
    }

    #[test]
    fn password_hash_round_trips_through_verify() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(Argon2Check.verify(&hash, "correct horse"));
        assert!(!Argon2Check.verify(&hash, "battery staple"));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!Argon2Check.verify("not-a-phc-string", "x"));
    }

    #[test]
    fn decoy_hash_is_a_real_argon2_hash() {
        assert!(DECOY_HASH.starts_with("$argon2id$"));
        assert!(PasswordHash::new(&DECOY_HASH).is_ok());
        assert!(!Argon2Check.verify(&DECOY_HASH, ""));
    }
}
