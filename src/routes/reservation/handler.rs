use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    utils::{error_body, internal_error, parse_date},
};

use super::model::{Reservation, bulk_delete_message, is_unique_violation};

#[derive(Debug, Deserialize)]
pub struct UpdateReservationRequest {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub requester_id: Option<i64>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub deleted: u64,
    pub message: String,
    pub requester_id: i64,
    pub from_date: String,
    pub to_date: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateReservationResponse {
    pub success: bool,
    pub reservation: Reservation,
}

#[axum::debug_handler]
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
) -> Response {
    match Reservation::delete_by_id(&state.pool, reservation_id).await {
        // 0 行受影响说明预订不存在，显式映射为 404
        Ok(0) => (StatusCode::NOT_FOUND, error_body("Reservation not found")).into_response(),
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting reservation {}: {}", reservation_id, e);
            internal_error()
        }
    }
}

#[axum::debug_handler]
pub async fn update_reservation(
    State(state): State<AppState>,
    Path(reservation_id): Path<i64>,
    Json(req): Json<UpdateReservationRequest>,
) -> Response {
    let raw_date = match req.date {
        Some(date) => date,
        None => {
            return (StatusCode::BAD_REQUEST, error_body("date is required")).into_response();
        }
    };

    let date = match parse_date(&raw_date) {
        Ok(date) => date,
        Err(_) => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid date format")).into_response();
        }
    };

    match Reservation::update_date(&state.pool, reservation_id, date).await {
        Ok(Some(reservation)) => (
            StatusCode::OK,
            Json(UpdateReservationResponse {
                success: true,
                reservation,
            }),
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, error_body("Reservation not found")).into_response(),
        Err(e) if is_unique_violation(&e) => (
            StatusCode::CONFLICT,
            error_body("Seat is already reserved for this date"),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error updating reservation {}: {}", reservation_id, e);
            internal_error()
        }
    }
}

#[axum::debug_handler]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(req): Json<BulkDeleteRequest>,
) -> Response {
    let (requester_id, from_raw, to_raw) = match (req.requester_id, req.from_date, req.to_date) {
        (Some(requester_id), Some(from), Some(to)) => (requester_id, from, to),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("requesterId, fromDate, and toDate are required"),
            )
                .into_response();
        }
    };

    let (from, to) = match (parse_date(&from_raw), parse_date(&to_raw)) {
        (Ok(from), Ok(to)) => (from, to),
        _ => {
            return (StatusCode::BAD_REQUEST, error_body("Invalid date format")).into_response();
        }
    };

    if from > to {
        return (
            StatusCode::BAD_REQUEST,
            error_body("fromDate must be before or equal to toDate"),
        )
            .into_response();
    }

    match Reservation::delete_range_for_user(&state.pool, requester_id, from, to).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(BulkDeleteResponse {
                deleted,
                message: bulk_delete_message(deleted, requester_id, &from_raw, &to_raw),
                requester_id,
                from_date: from_raw,
                to_date: to_raw,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(
                "Error bulk deleting reservations for user {}: {}",
                requester_id,
                e
            );
            internal_error()
        }
    }
}
