use chrono::{DateTime, Utc};
use gym_core::errors::GymResult;
use gym_core::models::membership::Membership;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::{convert_all, DbMembership};
use crate::repositories::expect_one;

const COLUMNS: &str = "id, member_id, plan_id, start_date, end_date, status, auto_renew, \
     payment_method_id, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, membership: &Membership) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO memberships (
            id, member_id, plan_id, start_date, end_date, status, auto_renew,
            payment_method_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(membership.id)
    .bind(membership.member_id)
    .bind(membership.plan_id)
    .bind(membership.start_date)
    .bind(membership.end_date)
    .bind(membership.status.as_str())
    .bind(membership.auto_renew)
    .bind(&membership.payment_method_id)
    .bind(membership.created_at)
    .bind(membership.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

async fn fetch_one(
    conn: &mut PgConnection,
    id: Uuid,
    lock: bool,
) -> GymResult<Option<Membership>> {
    let suffix = if lock { " FOR UPDATE" } else { "" };
    let row = sqlx::query_as::<_, DbMembership>(&format!(
        "SELECT {COLUMNS} FROM memberships WHERE id = $1{suffix}"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;
    row.map(Membership::try_from).transpose()
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Membership>> {
    fetch_one(conn, id, false).await
}

pub async fn lock(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Membership>> {
    fetch_one(conn, id, true).await
}

pub async fn list_by_member(conn: &mut PgConnection, member_id: Uuid) -> GymResult<Vec<Membership>> {
    let rows = sqlx::query_as::<_, DbMembership>(&format!(
        "SELECT {COLUMNS} FROM memberships WHERE member_id = $1 \
         ORDER BY start_date DESC, created_at DESC"
    ))
    .bind(member_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn list_due(conn: &mut PgConnection, now: DateTime<Utc>) -> GymResult<Vec<Membership>> {
    let rows = sqlx::query_as::<_, DbMembership>(&format!(
        "SELECT {COLUMNS} FROM memberships \
         WHERE status = 'active' AND end_date <= $1 \
         ORDER BY end_date ASC \
         FOR UPDATE"
    ))
    .bind(now)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn update(conn: &mut PgConnection, membership: &Membership) -> GymResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE memberships
        SET status = $2, auto_renew = $3, payment_method_id = $4, updated_at = $5
        WHERE id = $1
        "#,
    )
    .bind(membership.id)
    .bind(membership.status.as_str())
    .bind(membership.auto_renew)
    .bind(&membership.payment_method_id)
    .bind(membership.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    expect_one(result, "Membership", membership.id)
}
