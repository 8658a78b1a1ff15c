use gym_core::errors::GymResult;
use gym_core::models::gym::Gym;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::DbGym;
use crate::repositories::expect_one;

const COLUMNS: &str =
    "id, name, address, phone, timezone, opening_hours, settings, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, gym: &Gym) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO gyms (
            id, name, address, phone, timezone, opening_hours, settings,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(gym.id)
    .bind(&gym.name)
    .bind(&gym.address)
    .bind(&gym.phone)
    .bind(&gym.timezone)
    .bind(&gym.opening_hours)
    .bind(&gym.settings)
    .bind(gym.created_at)
    .bind(gym.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Gym>> {
    let row = sqlx::query_as::<_, DbGym>(&format!("SELECT {COLUMNS} FROM gyms WHERE id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)?;
    Ok(row.map(Gym::from))
}

pub async fn list(conn: &mut PgConnection) -> GymResult<Vec<Gym>> {
    let rows = sqlx::query_as::<_, DbGym>(&format!("SELECT {COLUMNS} FROM gyms ORDER BY name"))
        .fetch_all(conn)
        .await
        .map_err(map_db_error)?;
    Ok(rows.into_iter().map(Gym::from).collect())
}

pub async fn update(conn: &mut PgConnection, gym: &Gym) -> GymResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE gyms
        SET name = $2, address = $3, phone = $4, timezone = $5,
            opening_hours = $6, settings = $7, updated_at = $8
        WHERE id = $1
        "#,
    )
    .bind(gym.id)
    .bind(&gym.name)
    .bind(&gym.address)
    .bind(&gym.phone)
    .bind(&gym.timezone)
    .bind(&gym.opening_hours)
    .bind(&gym.settings)
    .bind(gym.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    expect_one(result, "Gym", gym.id)
}
