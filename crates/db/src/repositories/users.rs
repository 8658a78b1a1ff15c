use gym_core::errors::GymResult;
use gym_core::models::user::{Role, User};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::{map_db_error, map_user_insert_error};
use crate::models::{convert_all, DbUser};

const COLUMNS: &str = "id, first_name, last_name, email, password_hash, phone_number, \
     date_of_birth, gender, fitness_goals, emergency_contact_name, emergency_contact_phone, \
     role, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, user: &User) -> GymResult<()> {
    tracing::debug!(user_id = %user.id, role = %user.role, "inserting user");

    sqlx::query(
        r#"
        INSERT INTO users (
            id, first_name, last_name, email, password_hash, phone_number,
            date_of_birth, gender, fitness_goals, emergency_contact_name,
            emergency_contact_phone, role, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.phone_number)
    .bind(user.date_of_birth)
    .bind(&user.gender)
    .bind(&user.fitness_goals)
    .bind(&user.emergency_contact_name)
    .bind(&user.emergency_contact_phone)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(conn)
    .await
    .map_err(|e| map_user_insert_error(e, &user.email))?;

    Ok(())
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<User>> {
    let row = sqlx::query_as::<_, DbUser>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)?;
    row.map(User::try_from).transpose()
}

pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> GymResult<Option<User>> {
    let row =
        sqlx::query_as::<_, DbUser>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(conn)
            .await
            .map_err(map_db_error)?;
    row.map(User::try_from).transpose()
}

pub async fn list(conn: &mut PgConnection, role: Option<Role>) -> GymResult<Vec<User>> {
    let rows = sqlx::query_as::<_, DbUser>(&format!(
        "SELECT {COLUMNS} FROM users \
         WHERE ($1::TEXT IS NULL OR role = $1) \
         ORDER BY created_at DESC"
    ))
    .bind(role.map(|r| r.as_str()))
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;
    convert_all(rows)
}
