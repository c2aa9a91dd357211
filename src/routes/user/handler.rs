use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState,
    middleware::CurrentUser,
    utils::{email_has_valid_shape, error_body, internal_error},
};

use super::model::{OAuthCredential, TokenExportResponse, User, api_key_matches};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    // 会话可能指向已经不存在的用户，按 404 处理
    match User::find_by_id(&state.pool, current.id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, error_body("User not found")).into_response(),
        Err(e) => {
            tracing::error!("Error fetching user {}: {}", current.id, e);
            internal_error()
        }
    }
}

/// 对外自动化工具（Zapier、n8n 等）的令牌导出接口：
/// GET /user/{email}/tokens?apiKey=... 或 x-api-key 请求头
#[axum::debug_handler]
pub async fn export_tokens(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Response {
    let supplied = query.api_key.as_deref().or_else(|| {
        headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
    });

    if !api_key_matches(state.config.api_secret_key.as_deref(), supplied) {
        return (
            StatusCode::UNAUTHORIZED,
            error_body("Unauthorized - Invalid API key"),
        )
            .into_response();
    }

    if !email_has_valid_shape(&email) {
        return (StatusCode::BAD_REQUEST, error_body("Invalid email format")).into_response();
    }

    let user = match User::find_by_email(&state.pool, &email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, error_body("User not found")).into_response();
        }
        Err(e) => {
            tracing::error!("Error fetching user {}: {}", email, e);
            return internal_error();
        }
    };

    let oauth = match OAuthCredential::find_by_user(&state.pool, user.id).await {
        Ok(Some(oauth)) => oauth,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_body("User has not connected OAuth"),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Error fetching oauth for user {}: {}", user.id, e);
            return internal_error();
        }
    };

    if !oauth.calendar_consent {
        return (
            StatusCode::FORBIDDEN,
            error_body("User has not granted consent"),
        )
            .into_response();
    }

    let (access_token, refresh_token) = match (oauth.google_access_token, oauth.google_refresh_token)
    {
        (Some(access), Some(refresh)) => (access, refresh),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                error_body("User tokens not found - user needs to re-authenticate"),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(TokenExportResponse {
            email: user.email,
            name: None,
            access_token,
            refresh_token,
            has_consent: oauth.calendar_consent,
            consent_granted_at: oauth.consent_granted_at,
        }),
    )
        .into_response()
}
