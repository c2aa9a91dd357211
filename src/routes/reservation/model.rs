use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Serialize, FromRow)]
pub struct Reservation {
    pub id: i64,
    pub seat_id: i64,
    pub user_id: i64,
    pub date_of_reservation: NaiveDate,
}

/// (seat_id, date_of_reservation) 唯一约束触发即视为座位冲突
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl Reservation {
    /// 预订前的存在性检查；唯一约束才是权威的冲突信号
    pub async fn exists_for(
        pool: &PgPool,
        seat_id: i64,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM seat_reservations WHERE seat_id = $1 AND date_of_reservation = $2",
        )
        .bind(seat_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    pub async fn create(
        pool: &PgPool,
        seat_id: i64,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO seat_reservations (seat_id, user_id, date_of_reservation)
            VALUES ($1, $2, $3)
            RETURNING id, seat_id, user_id, date_of_reservation
            "#,
        )
        .bind(seat_id)
        .bind(user_id)
        .bind(date)
        .fetch_one(pool)
        .await
    }

    /// 按ID删除，返回实际删除的行数（0 行映射为 404）
    pub async fn delete_by_id(pool: &PgPool, reservation_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seat_reservations WHERE id = $1")
            .bind(reservation_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// 改期；不存在的ID返回 None
    pub async fn update_date(
        pool: &PgPool,
        reservation_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE seat_reservations
            SET date_of_reservation = $2
            WHERE id = $1
            RETURNING id, seat_id, user_id, date_of_reservation
            "#,
        )
        .bind(reservation_id)
        .bind(date)
        .fetch_optional(pool)
        .await
    }

    /// 删除用户在闭区间内的所有预订，返回删除数量
    pub async fn delete_range_for_user(
        pool: &PgPool,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM seat_reservations
            WHERE user_id = $1
              AND date_of_reservation >= $2
              AND date_of_reservation <= $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

pub fn bulk_delete_message(deleted: u64, user_id: i64, from: &str, to: &str) -> String {
    let plural = if deleted == 1 { "" } else { "s" };
    format!(
        "Deleted {} reservation{} for user {} from {} to {}",
        deleted, plural, user_id, from, to
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_serializes_with_iso_date() {
        let reservation = Reservation {
            id: 1,
            seat_id: 2,
            user_id: 7,
            date_of_reservation: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        };
        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!(json["date_of_reservation"], "2025-01-10");
        assert_eq!(json["seat_id"], 2);
    }

    #[test]
    fn bulk_message_handles_plural() {
        assert_eq!(
            bulk_delete_message(1, 7, "2025-01-01", "2025-01-31"),
            "Deleted 1 reservation for user 7 from 2025-01-01 to 2025-01-31"
        );
        assert_eq!(
            bulk_delete_message(0, 7, "2025-01-01", "2025-01-31"),
            "Deleted 0 reservations for user 7 from 2025-01-01 to 2025-01-31"
        );
        assert_eq!(
            bulk_delete_message(3, 7, "2025-01-01", "2025-01-31"),
            "Deleted 3 reservations for user 7 from 2025-01-01 to 2025-01-31"
        );
    }
}
