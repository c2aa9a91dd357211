use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState,
    utils::{error_body, internal_error, parse_date_or_today},
};

use super::model::{Room, RoomDetail, RoomSummary, SeatView};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[axum::debug_handler]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Response {
    let date = match parse_date_or_today(query.date.as_deref()) {
        Ok(date) => date,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid date format")).into_response();
        }
    };

    match Room::occupancy_for_date(&state.pool, date).await {
        Ok(rows) => {
            let rooms = rows
                .into_iter()
                .map(RoomSummary::from_occupancy)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(rooms)).into_response()
        }
        Err(e) => {
            tracing::error!("Error fetching rooms: {}", e);
            internal_error()
        }
    }
}

#[axum::debug_handler]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    Query(query): Query<DateQuery>,
) -> Response {
    let date = match parse_date_or_today(query.date.as_deref()) {
        Ok(date) => date,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid date format")).into_response();
        }
    };

    let room = match Room::find_by_id(&state.pool, room_id).await {
        Ok(Some(room)) => room,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, error_body("Room not found")).into_response();
        }
        Err(e) => {
            tracing::error!("Error fetching room {}: {}", room_id, e);
            return internal_error();
        }
    };

    match Room::seats_for_date(&state.pool, room_id, date).await {
        Ok(rows) => {
            let seats = rows.into_iter().map(SeatView::from_row).collect::<Vec<_>>();
            let detail = RoomDetail {
                id: room.id,
                name: room.name,
                seats,
            };
            (StatusCode::OK, Json(detail)).into_response()
        }
        Err(e) => {
            tracing::error!("Error fetching seats for room {}: {}", room_id, e);
            internal_error()
        }
    }
}
