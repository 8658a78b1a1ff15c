use gym_core::errors::GymResult;
use gym_core::models::class::Class;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::map_db_error;
use crate::models::DbClass;

const COLUMNS: &str = "id, gym_id, title, description, trainer_id, capacity, recurring_rule, \
     duration_minutes, created_at, updated_at";

pub async fn insert(conn: &mut PgConnection, class: &Class) -> GymResult<()> {
    sqlx::query(
        r#"
        INSERT INTO classes (
            id, gym_id, title, description, trainer_id, capacity, recurring_rule,
            duration_minutes, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(class.id)
    .bind(class.gym_id)
    .bind(&class.title)
    .bind(&class.description)
    .bind(class.trainer_id)
    .bind(class.capacity)
    .bind(&class.recurring_rule)
    .bind(class.duration_minutes)
    .bind(class.created_at)
    .bind(class.updated_at)
    .execute(conn)
    .await
    .map_err(map_db_error)?;
    Ok(())
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> GymResult<Option<Class>> {
    let row =
        sqlx::query_as::<_, DbClass>(&format!("SELECT {COLUMNS} FROM classes WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(map_db_error)?;
    Ok(row.map(Class::from))
}

pub async fn list(conn: &mut PgConnection) -> GymResult<Vec<Class>> {
    let rows =
        sqlx::query_as::<_, DbClass>(&format!("SELECT {COLUMNS} FROM classes ORDER BY title"))
            .fetch_all(conn)
            .await
            .map_err(map_db_error)?;
    Ok(rows.into_iter().map(Class::from).collect())
}
