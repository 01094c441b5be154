use crate::models::DbRoom;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_rooms_by_ids(pool: &Pool<Postgres>, ids: &[Uuid]) -> Result<Vec<DbRoom>> {
    let rooms = sqlx::query_as::<_, DbRoom>(
        r#"
        SELECT id, name, capacity
        FROM rooms
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(rooms)
}
