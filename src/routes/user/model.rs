use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, FromRow)]
pub struct OAuthCredential {
    pub user_id: i64,
    pub google_access_token: Option<String>,
    pub google_refresh_token: Option<String>,
    pub calendar_consent: bool,
    pub consent_granted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExportResponse {
    pub email: String,
    /// users 表不存姓名，固定为 null（与原接口一致）
    pub name: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub has_consent: bool,
    pub consent_granted_at: Option<DateTime<Utc>>,
}

impl User {
    pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// 按邮箱 upsert，已存在时不改任何字段（幂等）
    pub async fn upsert_by_email(pool: &PgPool, email: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await
    }
}

impl OAuthCredential {
    pub async fn find_by_user(pool: &PgPool, user_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, OAuthCredential>(
            r#"
            SELECT user_id, google_access_token, google_refresh_token,
                   calendar_consent, consent_granted_at
            FROM oauth
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// 每次登录都覆盖令牌、强制 consent 为真并刷新授权时间
    pub async fn upsert(
        pool: &PgPool,
        user_id: i64,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO oauth
                (user_id, key, google_access_token, google_refresh_token,
                 calendar_consent, consent_granted_at)
            VALUES ($1, $2, $3, $4, TRUE, now())
            ON CONFLICT (user_id) DO UPDATE SET
                key = EXCLUDED.key,
                google_access_token = EXCLUDED.google_access_token,
                google_refresh_token = EXCLUDED.google_refresh_token,
                calendar_consent = TRUE,
                consent_granted_at = now(),
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(user_id.to_string())
        .bind(access_token)
        .bind(refresh_token)
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// 共享密钥校验；密钥未配置时一律拒绝（fail closed）
pub fn api_key_matches(configured: Option<&str>, supplied: Option<&str>) -> bool {
    match (configured, supplied) {
        (Some(secret), Some(key)) => !secret.is_empty() && secret == key,
        _ => false,
    }
}
