use std::sync::Arc;

use axum::http::StatusCode;
use mockall::predicate::always;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timetable_core::{
    errors::TimeError,
    models::{TimetableEntry, Weekday},
};
use timetable_db::mock::MockGateway;
use uuid::Uuid;

use crate::test_utils::{server_for, window, TestContext};

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let health = server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>(), json!({ "status": "ok" }));

    let version = server.get("/version").await;
    version.assert_status_ok();
    assert_eq!(version.json::<Value>()["name"], "timetable-api");
}

#[tokio::test]
async fn test_catalog_lists_fifty_slots() {
    let ctx = TestContext::new().await;

    let response = ctx.server().get("/api/catalog").await;

    response.assert_status_ok();
    let slots = response.json::<Vec<Value>>();
    assert_eq!(slots.len(), 50);
    assert_eq!(
        slots[0],
        json!({ "day": "mon", "start": "07:00", "end": "09:00", "duration": "two_hours" })
    );
}

#[test_log::test(tokio::test)]
async fn test_generate_places_and_commits() {
    let ctx = TestContext::new().await;
    let lecturer_id = Uuid::new_v4();
    let first = ctx.add_assignment(lecturer_id, 40).await;
    let second = ctx.add_assignment(lecturer_id, 40).await;
    ctx.add_term(
        "1",
        2025,
        &[
            window(Weekday::Mon, "07:00", "09:00"),
            window(Weekday::Mon, "08:00", "10:00"),
        ],
    )
    .await;

    let response = ctx
        .server()
        .post("/api/timetable/generate")
        .json(&json!({ "semester": "1", "year": 2025 }))
        .await;

    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["created"].as_array().unwrap().len(), 1);
    assert_eq!(report["created"][0]["assignment_id"], json!(first.id));
    assert_eq!(
        report["unassigned"],
        json!([{ "assignment_id": second.id, "reason": "no available slot without clash" }])
    );
    assert_eq!(ctx.gateway.entries().await.len(), 1);
}

#[tokio::test]
async fn test_generate_dry_run_writes_nothing() {
    let ctx = TestContext::new().await;
    ctx.add_assignment(Uuid::new_v4(), 40).await;
    ctx.add_term("2", 2025, &[window(Weekday::Fri, "13:00", "16:00")]).await;

    let response = ctx
        .server()
        .post("/api/timetable/generate")
        .json(&json!({ "semester": "2", "year": 2025, "dry_run": true }))
        .await;

    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["placed"].as_array().unwrap().len(), 1);
    assert_eq!(report["created"], json!([]));
    assert!(ctx.gateway.entries().await.is_empty());
}

#[tokio::test]
async fn test_generate_without_timeslots_is_bad_request() {
    let ctx = TestContext::new().await;
    ctx.add_assignment(Uuid::new_v4(), 40).await;

    let response = ctx
        .server()
        .post("/api/timetable/generate")
        .json(&json!({ "semester": "1", "year": 2031 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("No time slots available"));
}

#[tokio::test]
async fn test_generate_rejects_blank_semester() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server()
        .post("/api/timetable/generate")
        .json(&json!({ "semester": " ", "year": 2025 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

async fn seed_overlap(ctx: &TestContext) -> Uuid {
    let lecturer_id = Uuid::new_v4();
    let first = ctx.add_assignment(lecturer_id, 40).await;
    let second = ctx.add_assignment(lecturer_id, 40).await;
    ctx.gateway
        .add_entry(TimetableEntry::for_assignment(
            Uuid::new_v4(),
            &first,
            window(Weekday::Mon, "07:00", "09:00"),
        ))
        .await;
    ctx.gateway
        .add_entry(TimetableEntry::for_assignment(
            Uuid::new_v4(),
            &second,
            window(Weekday::Mon, "08:00", "10:00"),
        ))
        .await;
    lecturer_id
}

#[tokio::test]
async fn test_clashes_reports_lecturer_then_room() {
    let ctx = TestContext::new().await;
    let lecturer_id = seed_overlap(&ctx).await;

    let response = ctx.server().get("/api/timetable/clashes").await;

    response.assert_status_ok();
    let records = response.json::<Vec<Value>>();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["type"], "lecturer_clash");
    assert_eq!(records[0]["key_id"], json!(lecturer_id));
    assert_eq!(records[1]["type"], "room_clash");
    assert_eq!(records[1]["key_id"], json!(ctx.room_id));
    assert_eq!(records[0]["entry1"]["start"], "07:00");
    assert_eq!(records[0]["entry2"]["start"], "08:00");
    assert_eq!(records[0]["entry2"]["lecturer_id"], json!(lecturer_id));
}

#[tokio::test]
async fn test_clashes_respects_filter() {
    let ctx = TestContext::new().await;
    seed_overlap(&ctx).await;

    let response = ctx
        .server()
        .get("/api/timetable/clashes")
        .add_query_param("lecturer_id", Uuid::new_v4())
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>(), Vec::<Value>::new());
}

#[tokio::test]
async fn test_validate_reports_clash_summary() {
    let ctx = TestContext::new().await;
    seed_overlap(&ctx).await;

    let response = ctx.server().get("/api/timetable/validate").await;

    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["valid"], json!(false));
    assert_eq!(
        report["errors"],
        json!(["Found 2 scheduling clashes (1 lecturer, 1 room)"])
    );
    assert_eq!(report["clashes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stats_summarise_timetable() {
    let ctx = TestContext::new().await;
    seed_overlap(&ctx).await;
    ctx.add_assignment(Uuid::new_v4(), 40).await;

    let response = ctx.server().get("/api/timetable/stats").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "active_entries": 2,
            "cancelled_entries": 0,
            "pending_assignments": 3,
            "confirmed_assignments": 0,
            "cancelled_assignments": 0,
            "total_entries": 2,
            "total_assignments": 3,
            "clash_count": 2,
        })
    );
}

#[tokio::test]
async fn test_storage_failure_is_a_server_error() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_live_entries()
        .with(always())
        .returning(|_| Err(TimeError::Database(eyre::eyre!("connection reset"))));

    let response = server_for(Arc::new(gateway))
        .get("/api/timetable/clashes")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Database error: connection reset" })
    );
}
