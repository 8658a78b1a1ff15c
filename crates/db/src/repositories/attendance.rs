use gym_core::errors::GymResult;
use gym_core::models::attendance::Attendance;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::{convert_all, DbAttendance};

const COLUMNS: &str = "id, session_id, member_id, checkin_method, checked_in_at, created_at";

pub async fn insert(conn: &mut PgConnection, attendance: &Attendance) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO attendance (id, session_id, member_id, checkin_method, checked_in_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(attendance.id)
    .bind(attendance.session_id)
    .bind(attendance.member_id)
    .bind(attendance.checkin_method.as_str())
    .bind(attendance.checked_in_at)
    .bind(attendance.created_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

pub async fn find(
    conn: &mut PgConnection,
    member_id: Uuid,
    session_id: Uuid,
) -> GymResult<Option<Attendance>> {
    let row = sqlx::query_as::<_, DbAttendance>(&format!(
        "SELECT {COLUMNS} FROM attendance WHERE member_id = $1 AND session_id = $2"
    ))
    .bind(member_id)
    .bind(session_id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    row.map(Attendance::try_from).transpose()
}

pub async fn list_by_member(conn: &mut PgConnection, member_id: Uuid) -> GymResult<Vec<Attendance>> {
    let rows = sqlx::query_as::<_, DbAttendance>(&format!(
        "SELECT {COLUMNS} FROM attendance WHERE member_id = $1 ORDER BY checked_in_at DESC"
    ))
    .bind(member_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn list(conn: &mut PgConnection) -> GymResult<Vec<Attendance>> {
    let rows = sqlx::query_as::<_, DbAttendance>(&format!(
        "SELECT {COLUMNS} FROM attendance ORDER BY checked_in_at DESC"
    ))
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}
