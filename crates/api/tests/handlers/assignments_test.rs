use std::sync::Arc;

use axum::http::StatusCode;
use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use timetable_db::mock::MockGateway;
use uuid::Uuid;

use crate::test_utils::{server_for, TestContext};

fn slot(day: &str, start: &str, end: &str) -> Value {
    json!({ "day": day, "start": start, "end": end })
}

#[tokio::test]
async fn test_select_until_confirmed() {
    let ctx = TestContext::new().await;
    let assignment = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let server = ctx.server();
    let path = format!("/api/assignments/{}/slots", assignment.id);

    let first = server.post(&path).json(&slot("mon", "07:00", "09:00")).await;
    first.assert_status(StatusCode::CREATED);
    let first = first.json::<Value>();
    assert_eq!(first["state"], "partial");
    assert_eq!(first["status"], "pending");
    assert_eq!(first["entry"]["day"], "mon");

    let second = server.post(&path).json(&slot("wed", "10:00", "13:00")).await;
    second.assert_status(StatusCode::CREATED);
    let second = second.json::<Value>();
    assert_eq!(second["state"], "confirmed");
    assert_eq!(second["status"], "confirmed");
    assert_eq!(second["live_count"], 2);

    let third = server.post(&path).json(&slot("fri", "07:00", "09:00")).await;
    third.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_select_accepts_full_day_names() {
    let ctx = TestContext::new().await;
    let assignment = ctx.add_assignment(Uuid::new_v4(), 40).await;

    let response = ctx
        .server()
        .post(&format!("/api/assignments/{}/slots", assignment.id))
        .json(&slot("Monday", "07:00", "09:00"))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["entry"]["day"], "mon");
}

#[tokio::test]
async fn test_select_taken_window_conflicts() {
    let ctx = TestContext::new().await;
    let holder = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let other = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let server = ctx.server();

    server
        .post(&format!("/api/assignments/{}/slots", holder.id))
        .json(&slot("tue", "09:00", "11:00"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post(&format!("/api/assignments/{}/slots", other.id))
        .json(&slot("tue", "09:00", "11:00"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert!(response.json::<Value>()["error"]
        .as_str()
        .unwrap()
        .contains("already taken"));
}

#[tokio::test]
async fn test_select_rejects_bad_windows() {
    let ctx = TestContext::new().await;
    let assignment = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let server = ctx.server();
    let path = format!("/api/assignments/{}/slots", assignment.id);

    // Inverted
    server
        .post(&path)
        .json(&slot("mon", "11:00", "09:00"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // One hour
    server
        .post(&path)
        .json(&slot("mon", "09:00", "10:00"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(ctx.gateway.entries().await.is_empty());
}

#[tokio::test]
async fn test_select_unknown_assignment_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server()
        .post(&format!("/api/assignments/{}/slots", Uuid::new_v4()))
        .json(&slot("mon", "07:00", "09:00"))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_withdraw_resets_to_pending() {
    let ctx = TestContext::new().await;
    let assignment = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let server = ctx.server();
    let path = format!("/api/assignments/{}/slots", assignment.id);

    server.post(&path).json(&slot("mon", "07:00", "09:00")).await;
    let latest = server.post(&path).json(&slot("thu", "16:00", "19:00")).await;
    let latest_id = latest.json::<Value>()["entry"]["id"].clone();

    let response = server.delete(&path).await;

    response.assert_status_ok();
    let outcome = response.json::<Value>();
    assert_eq!(outcome["removed_entry"], latest_id);
    assert_eq!(outcome["remaining"], 1);
    assert_eq!(outcome["status"], "pending");
}

#[tokio::test]
async fn test_withdraw_with_nothing_held() {
    let ctx = TestContext::new().await;
    let assignment = ctx.add_assignment(Uuid::new_v4(), 40).await;

    let response = ctx
        .server()
        .delete(&format!("/api/assignments/{}/slots", assignment.id))
        .await;

    response.assert_status_ok();
    let outcome = response.json::<Value>();
    assert_eq!(outcome["removed_entry"], Value::Null);
    assert_eq!(outcome["remaining"], 0);
}

#[tokio::test]
async fn test_availability_marks_selected_red_and_green() {
    let ctx = TestContext::new().await;
    let mine = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let theirs = ctx.add_assignment(Uuid::new_v4(), 40).await;
    let server = ctx.server();

    server
        .post(&format!("/api/assignments/{}/slots", mine.id))
        .json(&slot("mon", "07:00", "09:00"))
        .await;
    server
        .post(&format!("/api/assignments/{}/slots", theirs.id))
        .json(&slot("mon", "09:00", "11:00"))
        .await;

    let response = server
        .get(&format!("/api/assignments/{}/availability", mine.id))
        .await;

    response.assert_status_ok();
    let report = response.json::<Value>();
    assert_eq!(report["selected_count"], 1);
    assert_eq!(report["can_select_more"], json!(true));

    let status_of = |day: &str, start: &str, end: &str| {
        report["slots"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["day"] == day && s["start"] == start && s["end"] == end)
            .map(|s| s["status"].clone())
            .unwrap()
    };
    assert_eq!(status_of("mon", "07:00", "09:00"), "selected");
    assert_eq!(status_of("mon", "09:00", "11:00"), "red");
    // Overlaps the red slot without matching it exactly.
    assert_eq!(status_of("mon", "10:00", "13:00"), "green");
}

#[tokio::test]
async fn test_availability_unknown_assignment() {
    let id = Uuid::new_v4();
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_assignment()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(None));

    let response = server_for(Arc::new(gateway))
        .get(&format!("/api/assignments/{}/availability", id))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}
