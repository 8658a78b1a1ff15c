use gym_core::errors::GymResult;
use gym_core::models::booking::Booking;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::{convert_all, DbBooking};
use crate::repositories::expect_one;

const COLUMNS: &str = "id, session_id, member_id, status, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, booking: &Booking) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bookings (id, session_id, member_id, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(booking.id)
    .bind(booking.session_id)
    .bind(booking.member_id)
    .bind(booking.status.as_str())
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

async fn fetch_one(conn: &mut PgConnection, id: Uuid, lock: bool) -> GymResult<Option<Booking>> {
    let suffix = if lock { " FOR UPDATE" } else { "" };
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE id = $1{suffix}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    row.map(Booking::try_from).transpose()
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Booking>> {
    fetch_one(conn, id, false).await
}

pub async fn lock(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Booking>> {
    fetch_one(conn, id, true).await
}

pub async fn find_active(
    conn: &mut PgConnection,
    member_id: Uuid,
    session_id: Uuid,
) -> GymResult<Option<Booking>> {
    let row = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {COLUMNS} FROM bookings \
         WHERE member_id = $1 AND session_id = $2 AND status <> 'cancelled'"
    ))
    .bind(member_id)
    .bind(session_id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    row.map(Booking::try_from).transpose()
}

pub async fn count_active(conn: &mut PgConnection, session_id: Uuid) -> GymResult<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM bookings WHERE session_id = $1 AND status <> 'cancelled'",
    )
    .bind(session_id)
    .fetch_one(conn)
    .await
    .map_err(map_db_error)
}

pub async fn update(conn: &mut PgConnection, booking: &Booking) -> GymResult<()> {
    let result = sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(booking.id)
        .bind(booking.status.as_str())
        .bind(booking.updated_at)
        .execute(conn)
        .await
        .map_err(map_db_error)?;
    expect_one(result, "Booking", booking.id)
}

pub async fn list_by_member(conn: &mut PgConnection, member_id: Uuid) -> GymResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE member_id = $1 ORDER BY created_at DESC"
    ))
    .bind(member_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn list_by_session(conn: &mut PgConnection, session_id: Uuid) -> GymResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, DbBooking>(&format!(
        "SELECT {COLUMNS} FROM bookings WHERE session_id = $1 ORDER BY created_at ASC"
    ))
    .bind(session_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}
