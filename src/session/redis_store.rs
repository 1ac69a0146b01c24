use async_trait::async_trait;
use redis::AsyncCommands;
use std::fmt;
use time::OffsetDateTime;
use tower_sessions::{
    session::{Id, Record},
    session_store, SessionStore,
};

use crate::redis_client::RedisClient;

/// Session records as JSON under `session:{id}`, expiring with `SET EX`.
#[derive(Clone)]
pub struct RedisSessionStore {
    redis: RedisClient,
}

impl fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSessionStore").finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    fn key(id: &Id) -> String {
        format!("session:{}", id)
    }
}

fn backend(err: redis::RedisError) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

fn encode(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

fn decode(raw: &str) -> session_store::Result<Record> {
    serde_json::from_str(raw).map_err(|e| session_store::Error::Decode(e.to_string()))
}

// whole seconds left, at least one so EX stays valid
fn ttl_seconds(record: &Record, now: OffsetDateTime) -> u64 {
    let left = (record.expiry_date - now).whole_seconds();
    u64::try_from(left).unwrap_or(0).max(1)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut conn = self.redis.conn.clone();
        loop {
            let reply: redis::Value = redis::cmd("SET")
                .arg(Self::key(&record.id))
                .arg(encode(record)?)
                .arg("EX")
                .arg(ttl_seconds(record, OffsetDateTime::now_utc()))
                .arg("NX")
                .query_async(&mut conn)
                .await
                .map_err(backend)?;
            if !matches!(reply, redis::Value::Nil) {
                return Ok(());
            }
            // id already in use
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn
            .set_ex(
                Self::key(&record.id),
                encode(record)?,
                ttl_seconds(record, OffsetDateTime::now_utc()),
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let mut conn = self.redis.conn.clone();
        let raw: Option<String> = conn.get(Self::key(id)).await.map_err(backend)?;
        raw.as_deref().map(decode).transpose()
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        let mut conn = self.redis.conn.clone();
        let _: () = conn.del(Self::key(id)).await.map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use time::Duration;

    fn record(expires_in: Duration) -> (Record, OffsetDateTime) {
        let now = OffsetDateTime::now_utc();
        let mut data = HashMap::new();
        data.insert("auth:user".to_string(), serde_json::json!(7));
        (Record { id: Id::default(), data, expiry_date: now + expires_in }, now)
    }

    #[test]
    fn ttl_follows_expiry_date() {
        let (live, now) = record(Duration::minutes(5));
        assert_eq!(ttl_seconds(&live, now), 300);

        let (expired, now) = record(Duration::seconds(-30));
        assert_eq!(ttl_seconds(&expired, now), 1);
    }

    #[test]
    fn stored_record_keeps_user() {
        let (original, _) = record(Duration::hours(1));
        let restored = decode(&encode(&original).unwrap()).unwrap();
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.data["auth:user"], 7);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode("not json"), Err(session_store::Error::Decode(_))));
    }
}
