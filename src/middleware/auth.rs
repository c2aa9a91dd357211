use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    cache::{SESSION_COOKIE, SessionStore},
    utils::error_body,
};

/// 已认证用户，由会话中间件写入请求扩展
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_session(&state, &jar).await {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => (StatusCode::UNAUTHORIZED, error_body("Not authenticated")).into_response(),
    }
}

/// 从会话 cookie 解析当前用户；没有有效会话时返回 None。
/// 变更操作的 handler 也用它做服务端身份替换：有会话时
/// 忽略请求体里的 user_id。
pub async fn resolve_session(state: &AppState, jar: &CookieJar) -> Option<CurrentUser> {
    let session_id = jar.get(SESSION_COOKIE)?.value().to_string();

    match SessionStore::get(&state.redis, &session_id).await {
        Ok(Some(session)) => Some(CurrentUser {
            id: session.user_id,
            email: session.email,
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::error!("Failed to load session {}: {}", session_id, e);
            None
        }
    }
}
