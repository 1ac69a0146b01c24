//! Cookie sessions on `tower-sessions`.
//!
//! The cookie carries an opaque session id; the record behind it holds the
//! authenticated user's id. Records live in a `MemoryStore` for the memory
//! backend and in Redis for production.

pub mod redis_store;

use async_trait::async_trait;
use time::Duration;
use tower_sessions::{
    cookie::SameSite,
    session::{Id, Record},
    session_store, Expiry, MemoryStore, Session, SessionManagerLayer, SessionStore,
};

pub use self::redis_store::RedisSessionStore;
use crate::config::SessionConfig;

const SESSION_USER_ID: &str = "auth:user";

// keeps OffsetDateTime arithmetic in range for absurd configs
const MAX_TTL_SECONDS: u64 = 365 * 86_400;

/// Where session records are kept, picked by `storage.backend`.
#[derive(Debug, Clone)]
pub enum SessionBackend {
    Memory(MemoryStore),
    Redis(RedisSessionStore),
}

impl SessionBackend {
    pub fn memory() -> Self {
        SessionBackend::Memory(MemoryStore::default())
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.create(record).await,
            SessionBackend::Redis(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.save(record).await,
            SessionBackend::Redis(store) => store.save(record).await,
        }
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            SessionBackend::Memory(store) => store.load(id).await,
            SessionBackend::Redis(store) => store.load(id).await,
        }
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.delete(id).await,
            SessionBackend::Redis(store) => store.delete(id).await,
        }
    }
}

/// Cookie layer: HttpOnly, SameSite=Strict, expiring after `ttl_seconds`
/// of inactivity.
pub fn layer(store: SessionBackend, config: &SessionConfig) -> SessionManagerLayer<SessionBackend> {
    let ttl = config.ttl_seconds.min(MAX_TTL_SECONDS) as i64;
    SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_http_only(true)
        .with_same_site(SameSite::Strict)
        .with_secure(config.secure)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(ttl)))
}

/// Authentication state kept in the session.
pub struct AuthSession<'a> {
    session: &'a Session,
}

impl<'a> AuthSession<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Binds the session to the user under a fresh id.
    pub async fn login(&self, user_id: i32) -> Result<(), tower_sessions::session::Error> {
        self.session.cycle_id().await?;
        self.session.insert(SESSION_USER_ID, user_id).await
    }

    pub async fn user_id(&self) -> Result<Option<i32>, tower_sessions::session::Error> {
        self.session.get::<i32>(SESSION_USER_ID).await
    }

    /// Drops the record from the store; the layer then expires the cookie.
    pub async fn logout(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.flush().await
    }
}
