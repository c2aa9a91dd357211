use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

/// 组装主路由：公开路由 + 需要会话的路由。
/// 限流和 CORS 属于部署层面的外层中间件，由 main 挂载。
pub fn create_router(state: AppState) -> Router {
    // 公开路由：房间/座位/预订接口服务于页面与自动化调用方，
    // 令牌导出由共享密钥保护，登录回调本身不可能有会话
    let public_routes = Router::new()
        .route("/rooms", get(routes::room::list_rooms))
        .route("/rooms/{id}", get(routes::room::get_room))
        .route("/seats/{seat_id}/reserve", post(routes::seat::reserve_seat))
        .route("/seats/random", post(routes::seat::random_reserve))
        .route(
            "/reservations/bulk",
            delete(routes::reservation::bulk_delete),
        )
        .route(
            "/reservations/{id}",
            delete(routes::reservation::delete_reservation)
                .patch(routes::reservation::update_reservation),
        )
        .route("/user/{email}/tokens", get(routes::user::export_tokens))
        .route("/auth/google", get(routes::auth::google_login))
        .route("/auth/google/callback", get(routes::auth::google_callback))
        .route("/auth/logout", post(routes::auth::logout));

    // 需要会话的路由
    let protected_routes = Router::new()
        .route("/user/me", get(routes::user::get_me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
