use crate::models::DbEntry;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres, Transaction};
use timetable_core::{gateway::EntryFilter, models::TimetableEntry};
use uuid::Uuid;

/// Advisory lock key shared by every timetable write.
const TIMETABLE_WRITE_LOCK: i64 = 0x7469_6d65_7461_626c;

/// Result of an insert that re-checks the selection limits under the
/// timetable write lock.
#[derive(Debug)]
pub enum GuardedInsert {
    Inserted {
        entry: DbEntry,
        live_count: i64,
        /// Assignment status after the insert.
        status: String,
    },
    CapReached,
    SlotTaken,
}

/// Result of committing a generated batch.
#[derive(Debug)]
pub enum BatchInsert {
    Inserted(Vec<DbEntry>),
    /// A lecturer in the batch picked up an overlapping entry since the
    /// batch was planned. Nothing was written.
    LecturerBusy(Uuid),
    /// The assignment would go past the cap. Nothing was written.
    CapReached(Uuid),
}

pub async fn get_live_entries(pool: &Pool<Postgres>, filter: &EntryFilter) -> Result<Vec<DbEntry>> {
    let window = filter.window;

    let entries = sqlx::query_as::<_, DbEntry>(
        r#"
        SELECT id, assignment_id, lecturer_id, unit_id, course_id, room_id,
               day, start_minute, end_minute, status, created_at
        FROM timetable_entries
        WHERE status = 'active'
          AND ($1::uuid IS NULL OR assignment_id = $1)
          AND ($2::uuid IS NULL OR lecturer_id = $2)
          AND ($3::uuid IS NULL OR room_id = $3)
          AND ($4::uuid IS NULL OR course_id = $4)
          AND ($5::text IS NULL OR (day = $5 AND start_minute = $6 AND end_minute = $7))
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(filter.assignment_id)
    .bind(filter.lecturer_id)
    .bind(filter.room_id)
    .bind(filter.course_id)
    .bind(window.map(|w| w.day.as_str()))
    .bind(window.map(|w| i32::from(w.start.minutes())))
    .bind(window.map(|w| i32::from(w.end.minutes())))
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Inserts `entry` unless its assignment already holds `cap` live entries or
/// any live entry occupies the exact same window. The assignment status moves
/// to confirmed at `cap` and back to pending below it, in the same
/// transaction; cancelled assignments keep their status.
pub async fn insert_entry_guarded(
    pool: &Pool<Postgres>,
    entry: &TimetableEntry,
    cap: i64,
) -> Result<GuardedInsert> {
    let mut tx = pool.begin().await?;
    lock_timetable(&mut tx).await?;

    let held: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM timetable_entries
        WHERE assignment_id = $1 AND status = 'active'
        "#,
    )
    .bind(entry.assignment_id)
    .fetch_one(&mut *tx)
    .await?;

    if held >= cap {
        tx.rollback().await?;
        return Ok(GuardedInsert::CapReached);
    }

    let taken: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM timetable_entries
        WHERE status = 'active' AND day = $1 AND start_minute = $2 AND end_minute = $3
        "#,
    )
    .bind(entry.window.day.as_str())
    .bind(i32::from(entry.window.start.minutes()))
    .bind(i32::from(entry.window.end.minutes()))
    .fetch_one(&mut *tx)
    .await?;

    if taken > 0 {
        tx.rollback().await?;
        return Ok(GuardedInsert::SlotTaken);
    }

    let inserted = insert_in(&mut tx, entry).await?;
    let live_count = held + 1;
    let target = if live_count >= cap { "confirmed" } else { "pending" };
    let status: String = sqlx::query_scalar(
        r#"
        UPDATE teaching_assignments
        SET status = CASE WHEN status = 'cancelled' THEN status ELSE $2 END
        WHERE id = $1
        RETURNING status
        "#,
    )
    .bind(entry.assignment_id)
    .bind(target)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(GuardedInsert::Inserted {
        entry: inserted,
        live_count,
        status,
    })
}

/// Inserts every entry or none of them, refusing the batch if any lecturer
/// already has an overlapping live entry or any assignment would hold more
/// than `cap` live entries. Assignments that reach `cap` are confirmed.
pub async fn insert_entries(
    pool: &Pool<Postgres>,
    entries: &[TimetableEntry],
    cap: i64,
) -> Result<BatchInsert> {
    let mut tx = pool.begin().await?;
    lock_timetable(&mut tx).await?;

    let mut inserted = Vec::with_capacity(entries.len());
    let mut touched: Vec<Uuid> = Vec::new();
    for entry in entries {
        // Rows written earlier in this batch are visible to the count.
        let held: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM timetable_entries
            WHERE assignment_id = $1 AND status = 'active'
            "#,
        )
        .bind(entry.assignment_id)
        .fetch_one(&mut *tx)
        .await?;

        if held >= cap {
            tx.rollback().await?;
            return Ok(BatchInsert::CapReached(entry.assignment_id));
        }

        let busy: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM timetable_entries
            WHERE status = 'active'
              AND lecturer_id = $1
              AND day = $2
              AND start_minute < $4
              AND end_minute > $3
            "#,
        )
        .bind(entry.lecturer_id)
        .bind(entry.window.day.as_str())
        .bind(i32::from(entry.window.start.minutes()))
        .bind(i32::from(entry.window.end.minutes()))
        .fetch_one(&mut *tx)
        .await?;

        if busy > 0 {
            tx.rollback().await?;
            return Ok(BatchInsert::LecturerBusy(entry.lecturer_id));
        }

        inserted.push(insert_in(&mut tx, entry).await?);
        if !touched.contains(&entry.assignment_id) {
            touched.push(entry.assignment_id);
        }
    }

    for assignment_id in touched {
        sqlx::query(
            r#"
            UPDATE teaching_assignments
            SET status = 'confirmed'
            WHERE id = $1
              AND status <> 'cancelled'
              AND (SELECT COUNT(*)
                   FROM timetable_entries
                   WHERE assignment_id = $1 AND status = 'active') >= $2
            "#,
        )
        .bind(assignment_id)
        .bind(cap)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(BatchInsert::Inserted(inserted))
}

/// Entry counts grouped by status.
pub async fn count_by_status(pool: &Pool<Postgres>) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT status, COUNT(*)
        FROM timetable_entries
        GROUP BY status
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn delete_entry(pool: &Pool<Postgres>, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM timetable_entries
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

// Held until the transaction ends.
async fn lock_timetable(tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(TIMETABLE_WRITE_LOCK)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn insert_in(tx: &mut Transaction<'_, Postgres>, entry: &TimetableEntry) -> Result<DbEntry> {
    let row = sqlx::query_as::<_, DbEntry>(
        r#"
        INSERT INTO timetable_entries
            (id, assignment_id, lecturer_id, unit_id, course_id, room_id,
             day, start_minute, end_minute, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, assignment_id, lecturer_id, unit_id, course_id, room_id,
                  day, start_minute, end_minute, status, created_at
        "#,
    )
    .bind(entry.id)
    .bind(entry.assignment_id)
    .bind(entry.lecturer_id)
    .bind(entry.unit_id)
    .bind(entry.course_id)
    .bind(entry.room_id)
    .bind(entry.window.day.as_str())
    .bind(i32::from(entry.window.start.minutes()))
    .bind(i32::from(entry.window.end.minutes()))
    .bind(entry.status.as_str())
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}
