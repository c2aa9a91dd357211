use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, FromRow)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

/// 单个房间在某天的占用统计（SQL 聚合结果）
#[derive(Debug, FromRow)]
pub struct RoomOccupancyRow {
    pub id: i64,
    pub name: String,
    pub total_seats: i64,
    pub reserved_seats: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: i64,
    pub name: String,
    pub total_seats: i64,
    pub reserved_seats: i64,
    pub available_seats: i64,
}

#[derive(Debug, Serialize)]
pub struct RoomDetail {
    pub id: i64,
    pub name: String,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Serialize)]
pub struct SeatView {
    pub id: i64,
    pub reservation: Option<ReservationView>,
}

#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub id: i64,
    pub user_id: i64,
    pub user_email: String,
    pub date_of_reservation: NaiveDate,
}

/// 座位与当天预订的左连接结果行
#[derive(Debug, FromRow)]
pub struct SeatReservationRow {
    pub seat_id: i64,
    pub reservation_id: Option<i64>,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub date_of_reservation: Option<NaiveDate>,
}

impl Room {
    pub async fn find_by_id(pool: &PgPool, room_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Room>("SELECT id, name FROM rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(pool)
            .await
    }

    /// 某天所有房间的占用统计，空库返回空列表
    pub async fn occupancy_for_date(
        pool: &PgPool,
        date: NaiveDate,
    ) -> Result<Vec<RoomOccupancyRow>, sqlx::Error> {
        sqlx::query_as::<_, RoomOccupancyRow>(
            r#"
            SELECT r.id, r.name,
                   COUNT(s.id) AS total_seats,
                   COUNT(sr.id) AS reserved_seats
            FROM rooms r
            LEFT JOIN seats s ON s.room_id = r.id
            LEFT JOIN seat_reservations sr
                ON sr.seat_id = s.id AND sr.date_of_reservation = $1
            GROUP BY r.id, r.name
            ORDER BY r.id
            "#,
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// 房间内的座位，各自带上当天（至多一条）的预订及预订人邮箱
    pub async fn seats_for_date(
        pool: &PgPool,
        room_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<SeatReservationRow>, sqlx::Error> {
        sqlx::query_as::<_, SeatReservationRow>(
            r#"
            SELECT s.id AS seat_id,
                   sr.id AS reservation_id,
                   sr.user_id,
                   u.email AS user_email,
                   sr.date_of_reservation
            FROM seats s
            LEFT JOIN seat_reservations sr
                ON sr.seat_id = s.id AND sr.date_of_reservation = $2
            LEFT JOIN users u ON u.id = sr.user_id
            WHERE s.room_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(room_id)
        .bind(date)
        .fetch_all(pool)
        .await
    }
}

impl RoomSummary {
    pub fn from_occupancy(row: RoomOccupancyRow) -> Self {
        let available = row.total_seats - row.reserved_seats;
        RoomSummary {
            id: row.id,
            name: row.name,
            total_seats: row.total_seats,
            reserved_seats: row.reserved_seats,
            available_seats: available,
        }
    }
}

impl SeatView {
    pub fn from_row(row: SeatReservationRow) -> Self {
        let reservation = match (row.reservation_id, row.user_id, row.date_of_reservation) {
            (Some(id), Some(user_id), Some(date)) => Some(ReservationView {
                id,
                user_id,
                user_email: row.user_email.unwrap_or_default(),
                date_of_reservation: date,
            }),
            _ => None,
        };
        SeatView {
            id: row.seat_id,
            reservation,
        }
    }
}
