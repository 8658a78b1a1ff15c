use gym_core::errors::GymResult;
use gym_core::models::payment::Payment;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::{convert_all, DbPayment};

const COLUMNS: &str = "id, member_id, amount_cents, currency, method, status, reference, \
     created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, payment: &Payment) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, member_id, amount_cents, currency, method, status, reference,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(payment.id)
    .bind(payment.member_id)
    .bind(payment.amount_cents)
    .bind(&payment.currency)
    .bind(&payment.method)
    .bind(payment.status.as_str())
    .bind(&payment.reference)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

pub async fn list_by_member(conn: &mut PgConnection, member_id: Uuid) -> GymResult<Vec<Payment>> {
    let rows = sqlx::query_as::<_, DbPayment>(&format!(
        "SELECT {COLUMNS} FROM payments WHERE member_id = $1 ORDER BY created_at DESC"
    ))
    .bind(member_id)
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}

pub async fn list(conn: &mut PgConnection) -> GymResult<Vec<Payment>> {
    let rows = sqlx::query_as::<_, DbPayment>(&format!(
        "SELECT {COLUMNS} FROM payments ORDER BY created_at DESC"
    ))
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}
