use gym_core::errors::GymResult;
use gym_core::models::plan::Plan;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::{convert_all, DbPlan};
use crate::repositories::expect_one;

const COLUMNS: &str = "id, title, description, price_cents, billing_cycle, session_quota, \
     access, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, plan: &Plan) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO plans (
            id, title, description, price_cents, billing_cycle, session_quota,
            access, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(plan.id)
    .bind(&plan.title)
    .bind(&plan.description)
    .bind(plan.price_cents)
    .bind(plan.billing_cycle.as_str())
    .bind(plan.session_quota)
    .bind(&plan.access)
    .bind(plan.created_at)
    .bind(plan.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Plan>> {
    let row = sqlx::query_as::<_, DbPlan>(&format!("SELECT {COLUMNS} FROM plans WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)?;
    row.map(Plan::try_from).transpose()
}

pub async fn list(conn: &mut PgConnection) -> GymResult<Vec<Plan>> {
    let rows = sqlx::query_as::<_, DbPlan>(&format!(
        "SELECT {COLUMNS} FROM plans ORDER BY price_cents ASC, title ASC"
    ))
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn update(conn: &mut PgConnection, plan: &Plan) -> GymResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE plans
        SET title = $2, description = $3, price_cents = $4, billing_cycle = $5,
            session_quota = $6, access = $7, updated_at = $8
        WHERE id = $1
        "#,
    )
    .bind(plan.id)
    .bind(&plan.title)
    .bind(&plan.description)
    .bind(plan.price_cents)
    .bind(plan.billing_cycle.as_str())
    .bind(plan.session_quota)
    .bind(&plan.access)
    .bind(plan.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    expect_one(result, "Plan", plan.id)
}
