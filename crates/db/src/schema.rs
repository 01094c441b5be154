use eyre::Result;
use sqlx::{Executor, Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create rooms table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rooms (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity >= 0)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create teaching_assignments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teaching_assignments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            lecturer_id UUID NOT NULL,
            unit_id UUID NOT NULL,
            course_id UUID NOT NULL,
            department_id UUID NOT NULL,
            room_id UUID NOT NULL REFERENCES rooms(id),
            student_count INTEGER NOT NULL CHECK (student_count >= 0),
            status VARCHAR(16) NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'confirmed', 'cancelled')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create time_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            semester VARCHAR(32) NOT NULL,
            year INTEGER NOT NULL,
            day VARCHAR(3) NOT NULL CHECK (day IN ('mon', 'tue', 'wed', 'thu', 'fri')),
            start_minute INTEGER NOT NULL,
            end_minute INTEGER NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            CONSTRAINT valid_slot_range CHECK (end_minute - start_minute IN (120, 180))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create timetable_entries table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS timetable_entries (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            assignment_id UUID NOT NULL REFERENCES teaching_assignments(id) ON DELETE CASCADE,
            lecturer_id UUID NOT NULL,
            unit_id UUID NOT NULL,
            course_id UUID NOT NULL,
            room_id UUID NOT NULL REFERENCES rooms(id),
            day VARCHAR(3) NOT NULL CHECK (day IN ('mon', 'tue', 'wed', 'thu', 'fri')),
            start_minute INTEGER NOT NULL,
            end_minute INTEGER NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'active'
                CHECK (status IN ('active', 'cancelled')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_minute > start_minute)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes; several statements, so this goes through the simple
    // query protocol
    pool.execute(
        r#"
        CREATE INDEX IF NOT EXISTS idx_teaching_assignments_status ON teaching_assignments(status);
        CREATE INDEX IF NOT EXISTS idx_time_slots_term ON time_slots(semester, year);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_assignment_id ON timetable_entries(assignment_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_lecturer_id ON timetable_entries(lecturer_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_room_id ON timetable_entries(room_id);
        CREATE INDEX IF NOT EXISTS idx_timetable_entries_window ON timetable_entries(day, start_minute, end_minute);
        "#,
    )
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
