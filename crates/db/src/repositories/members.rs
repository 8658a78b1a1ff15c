use gym_core::errors::GymResult;
use gym_core::models::member::Member;
use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::DbMember;
use crate::repositories::expect_one;

const COLUMNS: &str = "id, user_id, first_name, last_name, date_of_birth, gender, \
     emergency_contact, notes, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, member: &Member) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO members (
            id, user_id, first_name, last_name, date_of_birth, gender,
            emergency_contact, notes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(member.id)
    .bind(member.user_id)
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(member.date_of_birth)
    .bind(&member.gender)
    .bind(Json(&member.emergency_contact))
    .bind(&member.notes)
    .bind(member.created_at)
    .bind(member.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Member>> {
    let row =
        sqlx::query_as::<_, DbMember>(&format!("SELECT {COLUMNS} FROM members WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(map_db_error)?;
    Ok(row.map(Member::from))
}

pub async fn lock(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Member>> {
    let row = sqlx::query_as::<_, DbMember>(&format!(
        "SELECT {COLUMNS} FROM members WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    Ok(row.map(Member::from))
}

pub async fn find_by_user_id(conn: &mut PgConnection, user_id: Uuid) -> GymResult<Option<Member>> {
    let row = sqlx::query_as::<_, DbMember>(&format!(
        "SELECT {COLUMNS} FROM members WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    Ok(row.map(Member::from))
}

pub async fn list(conn: &mut PgConnection) -> GymResult<Vec<Member>> {
    let rows = sqlx::query_as::<_, DbMember>(&format!(
        "SELECT {COLUMNS} FROM members ORDER BY created_at DESC"
    ))
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    Ok(rows.into_iter().map(Member::from).collect())
}

pub async fn update(conn: &mut PgConnection, member: &Member) -> GymResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE members
        SET first_name = $2, last_name = $3, date_of_birth = $4, gender = $5,
            emergency_contact = $6, notes = $7, updated_at = $8
        WHERE id = $1
        "#,
    )
    .bind(member.id)
    .bind(&member.first_name)
    .bind(&member.last_name)
    .bind(member.date_of_birth)
    .bind(&member.gender)
    .bind(Json(&member.emergency_contact))
    .bind(&member.notes)
    .bind(member.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    expect_one(result, "Member", member.id)
}

/// Owned memberships, bookings, attendance and payments go with it by cascade.
pub async fn delete(conn: &mut PgConnection, id: Uuid) -> GymResult<bool> {
    let result = sqlx::query("DELETE FROM members WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await
        .map_err(map_db_error)?;
    Ok(result.rows_affected() > 0)
}
