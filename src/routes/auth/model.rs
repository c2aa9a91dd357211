use serde::Deserialize;

use crate::config::Config;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// 日历写权限 + 基础身份信息
const SCOPES: &str = "openid email profile https://www.googleapis.com/auth/calendar.events";

#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    /// 只有 access_type=offline 且强制 consent 时 Google 才返回
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleUserInfo {
    pub email: Option<String>,
}

/// 构造 Google 授权页 URL；offline + 强制 consent 保证每次都拿到 refresh_token
pub fn authorize_url(config: &Config) -> Result<String, url::ParseError> {
    let url = reqwest::Url::parse_with_params(
        AUTH_ENDPOINT,
        &[
            ("client_id", config.google_client_id.as_str()),
            ("redirect_uri", config.google_redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", SCOPES),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;
    Ok(url.to_string())
}

pub async fn exchange_code(
    http: &reqwest::Client,
    config: &Config,
    code: &str,
) -> Result<GoogleTokenResponse, reqwest::Error> {
    http.post(TOKEN_ENDPOINT)
        .form(&[
            ("code", code),
            ("client_id", config.google_client_id.as_str()),
            ("client_secret", config.google_client_secret.as_str()),
            ("redirect_uri", config.google_redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json::<GoogleTokenResponse>()
        .await
}

pub async fn fetch_userinfo(
    http: &reqwest::Client,
    access_token: &str,
) -> Result<GoogleUserInfo, reqwest::Error> {
    http.get(USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?
        .json::<GoogleUserInfo>()
        .await
}
