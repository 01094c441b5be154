use crate::models::DbTimeSlot;
use eyre::Result;
use sqlx::{Pool, Postgres};

pub async fn get_time_slots_by_term(
    pool: &Pool<Postgres>,
    semester: &str,
    year: i32,
) -> Result<Vec<DbTimeSlot>> {
    let time_slots = sqlx::query_as::<_, DbTimeSlot>(
        r#"
        SELECT id, semester, year, day, start_minute, end_minute, sort_order
        FROM time_slots
        WHERE semester = $1 AND year = $2
        ORDER BY sort_order ASC, id ASC
        "#,
    )
    .bind(semester)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(time_slots)
}
