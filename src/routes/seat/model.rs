use chrono::NaiveDate;
use rand::seq::SliceRandom;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::routes::reservation::model::Reservation;

/// 当天没有任何预订的座位（连同所属房间）
#[derive(Debug, Clone, FromRow)]
pub struct AvailableSeat {
    pub id: i64,
    pub room_id: i64,
    pub room_name: String,
}

#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub success: bool,
    pub reservation: Reservation,
}

#[derive(Debug, Serialize)]
pub struct RandomReserveResponse {
    pub reservation_id: i64,
    pub seat_id: i64,
    pub room_id: i64,
    pub room_name: String,
    pub date: NaiveDate,
}

impl AvailableSeat {
    pub async fn list_for_date(pool: &PgPool, date: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AvailableSeat>(
            r#"
            SELECT s.id, s.room_id, r.name AS room_name
            FROM seats s
            JOIN rooms r ON r.id = s.room_id
            WHERE NOT EXISTS (
                SELECT 1 FROM seat_reservations sr
                WHERE sr.seat_id = s.id AND sr.date_of_reservation = $1
            )
            ORDER BY s.id
            "#,
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }
}

/// 在可用座位中等概率随机取一个，空集返回 None
pub fn pick_random(seats: &[AvailableSeat]) -> Option<&AvailableSeat> {
    seats.choose(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seats(n: i64) -> Vec<AvailableSeat> {
        (1..=n)
            .map(|id| AvailableSeat {
                id,
                room_id: 1,
                room_name: "Blue room".to_string(),
            })
            .collect()
    }

    #[test]
    fn empty_set_yields_none() {
        assert!(pick_random(&[]).is_none());
    }

    #[test]
    fn single_seat_is_always_picked() {
        let available = seats(1);
        for _ in 0..10 {
            assert_eq!(pick_random(&available).unwrap().id, 1);
        }
    }

    #[test]
    fn every_seat_is_reachable() {
        // 每个座位都要有非零概率被选中
        let available = seats(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(pick_random(&available).unwrap().id);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn pick_stays_within_set() {
        let available = seats(5);
        for _ in 0..100 {
            let picked = pick_random(&available).unwrap();
            assert!((1..=5).contains(&picked.id));
        }
    }
}
