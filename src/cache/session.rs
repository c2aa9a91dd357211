use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 会话 cookie 名称
pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSession {
    pub session_id: String,
    pub user_id: i64,
    pub email: String,
    pub created_at: i64,
    pub expires_at: i64,
}

/// 会话缓存操作，键格式为 session:{id}
pub struct SessionStore;

impl SessionStore {
    /// 创建会话并返回会话ID
    pub async fn create(
        redis: &Arc<RedisClient>,
        user_id: i64,
        email: &str,
        ttl: u64,
    ) -> Result<String, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let session_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let session = CachedSession {
            session_id: session_id.clone(),
            user_id,
            email: email.to_string(),
            created_at: now,
            expires_at: now + ttl as i64,
        };

        let key = format!("session:{}", session_id);
        let json = serde_json::to_string(&session).map_err(|e| {
            redis::RedisError::from((redis::ErrorKind::IoError, "序列化错误", e.to_string()))
        })?;

        let _: () = conn.set_ex(key, json, ttl).await?;

        Ok(session_id)
    }

    /// 获取会话
    pub async fn get(
        redis: &Arc<RedisClient>,
        session_id: &str,
    ) -> Result<Option<CachedSession>, redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let key = format!("session:{}", session_id);
        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(json) => {
                let session = serde_json::from_str(&json).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "反序列化错误",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// 删除会话
    pub async fn remove(
        redis: &Arc<RedisClient>,
        session_id: &str,
    ) -> Result<(), redis::RedisError> {
        let mut conn = redis.get_multiplexed_async_connection().await?;

        let key = format!("session:{}", session_id);
        let _: () = conn.del(key).await?;

        Ok(())
    }
}
