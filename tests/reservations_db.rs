//! 依赖数据库的预订不变量测试：唯一约束、404 映射、区间删除。
//! #[sqlx::test] 会按 migrations/ 建好每个用例各自的临时库。

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use backend::{AppState, config::Config, router::create_router};
use backend::routes::reservation::model::{Reservation, is_unique_violation};
use chrono::NaiveDate;
use sqlx::PgPool;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        redis_url: "redis://127.0.0.1:1/".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        google_client_id: "client-123".to_string(),
        google_client_secret: "secret".to_string(),
        google_redirect_url: "http://127.0.0.1/auth/google/callback".to_string(),
        allowed_email_domain: "qest.cz".to_string(),
        post_login_redirect: "/".to_string(),
        api_secret_key: None,
        session_ttl_secs: 3600,
        rate_limit_window_secs: 60,
        rate_limit_requests: 100,
    }
}

fn make_router(pool: PgPool) -> Router {
    // 这些用例不带会话 cookie，redis 客户端不会被真正连接
    let redis = Arc::new(redis::Client::open("redis://127.0.0.1:1/").expect("redis client"));

    create_router(AppState {
        pool,
        config: test_config(),
        redis,
        http: reqwest::Client::new(),
    })
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// 一个房间、一个座位、两个用户；返回 (seat_id, user_a, user_b)
async fn seed(pool: &PgPool) -> (i64, i64, i64) {
    let (room_id,): (i64,) =
        sqlx::query_as("INSERT INTO rooms (name) VALUES ('Blue room') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let (seat_id,): (i64,) =
        sqlx::query_as("INSERT INTO seats (room_id) VALUES ($1) RETURNING id")
            .bind(room_id)
            .fetch_one(pool)
            .await
            .unwrap();
    let (user_a,): (i64,) =
        sqlx::query_as("INSERT INTO users (email) VALUES ('a@qest.cz') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    let (user_b,): (i64,) =
        sqlx::query_as("INSERT INTO users (email) VALUES ('b@qest.cz') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    (seat_id, user_a, user_b)
}

async fn reservation_count(pool: &PgPool, seat_id: i64, date: NaiveDate) -> i64 {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM seat_reservations WHERE seat_id = $1 AND date_of_reservation = $2",
    )
    .bind(seat_id)
    .bind(date)
    .fetch_one(pool)
    .await
    .unwrap();
    count
}

#[sqlx::test]
async fn duplicate_reservation_conflicts_and_keeps_one_row(pool: PgPool) {
    let (seat_id, user_a, user_b) = seed(&pool).await;
    let app = make_router(pool.clone());
    let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

    let body = format!(r#"{{"user_id": {}, "date": "2025-01-10"}}"#, user_a);
    let uri = format!("/seats/{}/reserve", seat_id);
    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["reservation"]["seat_id"], seat_id);

    // 另一个用户再订同一天的同一个座位
    let body = format!(r#"{{"user_id": {}, "date": "2025-01-10"}}"#, user_b);
    let response = app
        .oneshot(json_request("POST", &uri, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Seat is already reserved for this date");

    assert_eq!(reservation_count(&pool, seat_id, date).await, 1);
}

#[sqlx::test]
async fn unique_constraint_is_the_authoritative_conflict_signal(pool: PgPool) {
    // 绕开预检查直接插两次，第二次必须以唯一约束失败
    let (seat_id, user_a, user_b) = seed(&pool).await;
    let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

    Reservation::create(&pool, seat_id, user_a, date)
        .await
        .unwrap();
    let err = Reservation::create(&pool, seat_id, user_b, date)
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));
    assert_eq!(reservation_count(&pool, seat_id, date).await, 1);
}

#[sqlx::test]
async fn deleting_missing_reservation_returns_not_found(pool: PgPool) {
    seed(&pool).await;
    let app = make_router(pool.clone());

    let response = app
        .oneshot(json_request("DELETE", "/reservations/9999", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Reservation not found");
}

#[sqlx::test]
async fn deleted_reservation_disappears_from_room_detail(pool: PgPool) {
    let (seat_id, user_a, _) = seed(&pool).await;
    let app = make_router(pool.clone());
    let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();

    let reservation = Reservation::create(&pool, seat_id, user_a, date)
        .await
        .unwrap();

    let uri = format!("/reservations/{}", reservation.id);
    let response = app
        .oneshot(json_request("DELETE", &uri, "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);

    assert_eq!(reservation_count(&pool, seat_id, date).await, 0);
}

#[sqlx::test]
async fn bulk_delete_removes_exactly_the_range_for_the_requester(pool: PgPool) {
    let (seat_id, user_a, user_b) = seed(&pool).await;
    let app = make_router(pool.clone());

    // 区间端点要算在内，区间外和别人的预订都要留下
    for day in ["2025-01-01", "2025-01-15", "2025-01-31"] {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap();
        Reservation::create(&pool, seat_id, user_a, date)
            .await
            .unwrap();
    }
    let outside = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
    Reservation::create(&pool, seat_id, user_a, outside)
        .await
        .unwrap();
    let other_user_date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    Reservation::create(&pool, seat_id, user_b, other_user_date)
        .await
        .unwrap();

    let body = format!(
        r#"{{"requesterId": {}, "fromDate": "2025-01-01", "toDate": "2025-01-31"}}"#,
        user_a
    );
    let response = app
        .oneshot(json_request("DELETE", "/reservations/bulk", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["deleted"], 3);
    assert_eq!(json["requesterId"], user_a);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM seat_reservations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 2);
    assert_eq!(reservation_count(&pool, seat_id, outside).await, 1);
    assert_eq!(reservation_count(&pool, seat_id, other_user_date).await, 1);
}
