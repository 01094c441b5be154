use crate::models::DbAssignment;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn get_pending_assignments(
    pool: &Pool<Postgres>,
    department_id: Option<Uuid>,
    course_id: Option<Uuid>,
) -> Result<Vec<DbAssignment>> {
    let assignments = sqlx::query_as::<_, DbAssignment>(
        r#"
        SELECT id, lecturer_id, unit_id, course_id, department_id, room_id,
               student_count, status, created_at
        FROM teaching_assignments
        WHERE status = 'pending'
          AND ($1::uuid IS NULL OR department_id = $1)
          AND ($2::uuid IS NULL OR course_id = $2)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(department_id)
    .bind(course_id)
    .fetch_all(pool)
    .await?;

    Ok(assignments)
}

pub async fn get_assignment_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
) -> Result<Option<DbAssignment>> {
    let assignment = sqlx::query_as::<_, DbAssignment>(
        r#"
        SELECT id, lecturer_id, unit_id, course_id, department_id, room_id,
               student_count, status, created_at
        FROM teaching_assignments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(assignment)
}

pub async fn get_assignments_by_ids(
    pool: &Pool<Postgres>,
    ids: &[Uuid],
) -> Result<Vec<DbAssignment>> {
    let assignments = sqlx::query_as::<_, DbAssignment>(
        r#"
        SELECT id, lecturer_id, unit_id, course_id, department_id, room_id,
               student_count, status, created_at
        FROM teaching_assignments
        WHERE id = ANY($1)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await?;

    Ok(assignments)
}

/// Sets the status unless the assignment has been cancelled.
pub async fn update_assignment_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: &str,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE teaching_assignments
        SET status = $2
        WHERE id = $1 AND status <> 'cancelled'
        "#,
    )
    .bind(id)
    .bind(status)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Assignment counts grouped by status.
pub async fn count_by_status(pool: &Pool<Postgres>) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT status, COUNT(*)
        FROM teaching_assignments
        GROUP BY status
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
