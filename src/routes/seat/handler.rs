use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    AppState,
    middleware::resolve_session,
    routes::reservation::model::{Reservation, is_unique_violation},
    utils::{error_body, internal_error, parse_date},
};

use super::model::{AvailableSeat, RandomReserveResponse, ReserveResponse, pick_random};

#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    pub user_id: Option<i64>,
    pub date: Option<String>,
}

/// 确定预订的归属用户：有有效会话时一律以会话用户为准，
/// 请求体里的 user_id 只服务于无会话的自动化调用方
async fn acting_user(state: &AppState, jar: &CookieJar, body_user: Option<i64>) -> Option<i64> {
    match resolve_session(state, jar).await {
        Some(user) => Some(user.id),
        None => body_user,
    }
}

#[axum::debug_handler]
pub async fn reserve_seat(
    State(state): State<AppState>,
    Path(seat_id): Path<i64>,
    jar: CookieJar,
    Json(req): Json<ReserveRequest>,
) -> Response {
    let user_id = acting_user(&state, &jar, req.user_id).await;

    let (user_id, raw_date) = match (user_id, req.date) {
        (Some(user_id), Some(date)) => (user_id, date),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("user_id and date are required"),
            )
                .into_response();
        }
    };

    let date = match parse_date(&raw_date) {
        Ok(date) => date,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid date format")).into_response();
        }
    };

    // 预检查只提供常规路径的 409；并发下以唯一约束为准
    match Reservation::exists_for(&state.pool, seat_id, date).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                error_body("Seat is already reserved for this date"),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Error checking reservation for seat {}: {}", seat_id, e);
            return internal_error();
        }
    }

    match Reservation::create(&state.pool, seat_id, user_id, date).await {
        Ok(reservation) => (
            StatusCode::OK,
            Json(ReserveResponse {
                success: true,
                reservation,
            }),
        )
            .into_response(),
        Err(e) if is_unique_violation(&e) => (
            StatusCode::CONFLICT,
            error_body("Seat is already reserved for this date"),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error creating reservation for seat {}: {}", seat_id, e);
            internal_error()
        }
    }
}

#[axum::debug_handler]
pub async fn random_reserve(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<ReserveRequest>,
) -> Response {
    let user_id = acting_user(&state, &jar, req.user_id).await;

    let (user_id, raw_date) = match (user_id, req.date) {
        (Some(user_id), Some(date)) => (user_id, date),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("user_id and date are required"),
            )
                .into_response();
        }
    };

    let date = match parse_date(&raw_date) {
        Ok(date) => date,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid date format")).into_response();
        }
    };

    let available = match AvailableSeat::list_for_date(&state.pool, date).await {
        Ok(seats) => seats,
        Err(e) => {
            tracing::error!("Error fetching available seats: {}", e);
            return internal_error();
        }
    };

    let seat = match pick_random(&available) {
        Some(seat) => seat.clone(),
        None => {
            return (
                StatusCode::NOT_FOUND,
                error_body("No available seats for this date"),
            )
                .into_response();
        }
    };

    match Reservation::create(&state.pool, seat.id, user_id, date).await {
        Ok(reservation) => (
            StatusCode::OK,
            Json(RandomReserveResponse {
                reservation_id: reservation.id,
                seat_id: reservation.seat_id,
                room_id: seat.room_id,
                room_name: seat.room_name,
                date: reservation.date_of_reservation,
            }),
        )
            .into_response(),
        // 抢同一个座位输掉的一方
        Err(e) if is_unique_violation(&e) => (
            StatusCode::CONFLICT,
            error_body("Seat is already reserved for this date"),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error creating random reservation: {}", e);
            internal_error()
        }
    }
}
