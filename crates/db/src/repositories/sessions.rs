use gym_core::errors::GymResult;
use gym_core::models::class::ClassSession;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::{convert_all, DbClassSession};
use crate::repositories::expect_one;

const COLUMNS: &str = "id, class_id, starts_at, ends_at, capacity, status, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, session: &ClassSession) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO class_sessions (
            id, class_id, starts_at, ends_at, capacity, status, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(session.id)
    .bind(session.class_id)
    .bind(session.starts_at)
    .bind(session.ends_at)
    .bind(session.capacity)
    .bind(session.status.as_str())
    .bind(session.created_at)
    .bind(session.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

async fn fetch_one(
    conn: &mut PgConnection,
    id: Uuid,
    lock: bool,
) -> GymResult<Option<ClassSession>> {
    let suffix = if lock { " FOR UPDATE" } else { "" };
    let row = sqlx::query_as::<_, DbClassSession>(&format!(
        "SELECT {COLUMNS} FROM class_sessions WHERE id = $1{suffix}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    row.map(ClassSession::try_from).transpose()
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<ClassSession>> {
    fetch_one(conn, id, false).await
}

/// Holds the row lock until the surrounding transaction ends.
pub async fn lock(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<ClassSession>> {
    fetch_one(conn, id, true).await
}

pub async fn list(conn: &mut PgConnection, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>> {
    let rows = sqlx::query_as::<_, DbClassSession>(&format!(
        "SELECT {COLUMNS} FROM class_sessions \
         WHERE ($1::UUID IS NULL OR class_id = $1) \
         ORDER BY starts_at ASC"
    ))
    .bind(class_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn update(conn: &mut PgConnection, session: &ClassSession) -> GymResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE class_sessions
        SET starts_at = $2, ends_at = $3, capacity = $4, status = $5, updated_at = $6
        WHERE id = $1
        "#,
    )
    .bind(session.id)
    .bind(session.starts_at)
    .bind(session.ends_at)
    .bind(session.capacity)
    .bind(session.status.as_str())
    .bind(session.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    expect_one(result, "Session", session.id)
}
