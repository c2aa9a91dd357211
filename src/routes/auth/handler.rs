use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::{
    AppState,
    cache::{SESSION_COOKIE, SessionStore},
    routes::user::model::{OAuthCredential, User},
    utils::{email_in_allowed_domain, error_body, internal_error},
};

use super::model::{authorize_url, exchange_code, fetch_userinfo};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[axum::debug_handler]
pub async fn google_login(State(state): State<AppState>) -> Response {
    match authorize_url(&state.config) {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            tracing::error!("Failed to build authorize URL: {}", e);
            internal_error()
        }
    }
}

/// 登录回调：换码、取邮箱、域名检查、落库、发会话。
/// 任何一步失败都视为登录被拒，不会留下半成品状态。
#[axum::debug_handler]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!("Google sign-in denied: {}", error);
        return (StatusCode::UNAUTHORIZED, error_body("Sign-in was denied")).into_response();
    }

    let code = match query.code {
        Some(code) => code,
        None => {
            return (StatusCode::BAD_REQUEST, error_body("code is required")).into_response();
        }
    };

    let tokens = match exchange_code(&state.http, &state.config, &code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("Failed to exchange authorization code: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                error_body("Failed to exchange authorization code"),
            )
                .into_response();
        }
    };

    let email = match fetch_userinfo(&state.http, &tokens.access_token).await {
        Ok(info) => match info.email {
            Some(email) => email,
            None => {
                tracing::error!("Google userinfo did not include an email");
                return (
                    StatusCode::BAD_GATEWAY,
                    error_body("Identity provider returned no email"),
                )
                    .into_response();
            }
        },
        Err(e) => {
            tracing::error!("Failed to fetch userinfo: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                error_body("Failed to fetch user info"),
            )
                .into_response();
        }
    };

    // 域名检查在任何写库之前，域外邮箱不会留下任何行
    if !email_in_allowed_domain(&email, &state.config.allowed_email_domain) {
        tracing::warn!("Rejected sign-in from outside domain: {}", email);
        return (
            StatusCode::FORBIDDEN,
            error_body(format!(
                "Only @{} accounts are allowed",
                state.config.allowed_email_domain
            )),
        )
            .into_response();
    }

    let user = match User::upsert_by_email(&state.pool, &email).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to upsert user {}: {}", email, e);
            return internal_error();
        }
    };

    if let Err(e) = OAuthCredential::upsert(
        &state.pool,
        user.id,
        Some(tokens.access_token.as_str()),
        tokens.refresh_token.as_deref(),
    )
    .await
    {
        tracing::error!("Failed to store tokens for user {}: {}", user.id, e);
        return internal_error();
    }

    let session_id = match SessionStore::create(
        &state.redis,
        user.id,
        &user.email,
        state.config.session_ttl().as_secs(),
    )
    .await
    {
        Ok(session_id) => session_id,
        Err(e) => {
            tracing::error!("Failed to create session for user {}: {}", user.id, e);
            return internal_error();
        }
    };

    tracing::info!("User {} signed in", user.email);

    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (
        jar.add(cookie),
        Redirect::temporary(&state.config.post_login_redirect),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = SessionStore::remove(&state.redis, cookie.value()).await {
            tracing::error!("Failed to remove session: {}", e);
        }
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();

    (
        jar.remove(removal),
        axum::Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}
