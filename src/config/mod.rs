use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_url: String,
    pub allowed_email_domain: String,
    pub post_login_redirect: String,
    /// 令牌导出接口的共享密钥；未配置时所有请求一律拒绝
    pub api_secret_key: Option<String>,
    pub session_ttl_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let session_ttl = env::var("SESSION_TTL")
            .unwrap_or_default()
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            google_client_id: env::var("GOOGLE_CLIENT_ID")?,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")?,
            google_redirect_url: env::var("GOOGLE_REDIRECT_URL")?,
            allowed_email_domain: env::var("ALLOWED_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "qest.cz".to_string()),
            post_login_redirect: env::var("POST_LOGIN_REDIRECT")
                .unwrap_or_else(|_| "/".to_string()),
            api_secret_key: env::var("API_SECRET_KEY").ok(),
            session_ttl_secs: session_ttl * 3600,
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")
                .unwrap_or_default()
                .parse()
                .unwrap_or(60),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .unwrap_or_default()
                .parse()
                .unwrap_or(100),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_accessors_reflect_configured_seconds() {
        let config = Config {
            database_url: String::new(),
            redis_url: String::new(),
            server_host: String::new(),
            server_port: 3000,
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_redirect_url: String::new(),
            allowed_email_domain: "qest.cz".to_string(),
            post_login_redirect: "/".to_string(),
            api_secret_key: None,
            session_ttl_secs: 7200,
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
        };
        assert_eq!(config.session_ttl(), Duration::from_secs(7200));
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
    }
}
