// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Habit service tests against a fake backend.

use chrono::{Duration, TimeZone, Utc};
use habit_tracker::error::AppError;
use habit_tracker::models::{Category, Habit, HabitFilter, HabitPatch, HabitUpdate, NewHabit};
use habit_tracker::services::habits::FEATURED_LIMIT;
use habit_tracker::services::HabitService;
use habit_tracker::storage::{keys, KeyValueStore};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{habit_json, test_client, test_user};

fn service(server: &MockServer) -> (HabitService, habit_tracker::storage::MemoryStore) {
    let (client, store) = test_client(server);
    store.set(keys::TOKEN, "token-abc").unwrap();
    (HabitService::new(client), store)
}

fn draft() -> NewHabit {
    NewHabit {
        title: "Read".to_string(),
        description: "20 pages".to_string(),
        category: Category::Learning,
        reminder_time: Some("21:00".to_string()),
        image_url: None,
    }
}

#[tokio::test]
async fn test_list_for_user_sends_email_query() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("GET"))
        .and(path("/habits"))
        .and(query_param("userEmail", "owner+tag@example.com"))
        .and(header("authorization", "Bearer token-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([habit_json("h1", &[])])))
        .expect(1)
        .mount(&server)
        .await;

    let list = habits.list_for_user("owner+tag@example.com").await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, "h1");
}

#[tokio::test]
async fn test_guard_rejects_without_request() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("PUT"))
        .and(path("/habits/h1/complete"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();
    let this_morning = Utc.with_ymd_and_hms(2024, 6, 30, 7, 0, 0).unwrap();
    let habit: Habit = serde_json::from_value(habit_json("h1", &[this_morning])).unwrap();

    let err = habits.mark_complete(&habit, &now).await.unwrap_err();
    assert!(matches!(err, AppError::AlreadyCompletedToday));
    assert_eq!(
        err.user_message("Failed to mark habit as complete"),
        habit_tracker::error::ALREADY_COMPLETED_MESSAGE
    );
}

#[tokio::test]
async fn test_mark_complete_returns_backend_habit() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    let now = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();
    let yesterday = now - Duration::days(1);

    Mock::given(method("PUT"))
        .and(path("/habits/h1/complete"))
        .and(body_partial_json(json!({"completionDate": "2024-06-30T18:00:00.000Z"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(habit_json("h1", &[yesterday, now])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let habit: Habit = serde_json::from_value(habit_json("h1", &[yesterday])).unwrap();
    let updated = habits.mark_complete(&habit, &now).await.unwrap();

    assert_eq!(updated.completion_history.len(), 2);
    assert_eq!(updated.current_streak, 2);
}

#[tokio::test]
async fn test_mark_complete_appends_locally_without_habit_body() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("PUT"))
        .and(path("/habits/h1/complete"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true, "modifiedCount": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();
    let habit: Habit = serde_json::from_value(habit_json("h1", &[])).unwrap();
    let updated = habits.mark_complete(&habit, &now).await.unwrap();

    assert_eq!(updated.completion_history, vec![now]);
    // Original is untouched
    assert!(habit.completion_history.is_empty());
}

#[tokio::test]
async fn test_create_sends_owner_fields() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("POST"))
        .and(path("/habits"))
        .and(body_partial_json(json!({
            "title": "Read",
            "category": "Learning",
            "reminderTime": "21:00",
            "userEmail": "owner@example.com",
            "userName": "Owner",
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"acknowledged": true, "insertedId": "65b0"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let id = habits.create(&test_user(), &draft()).await.unwrap();
    assert_eq!(id.as_deref(), Some("65b0"));
}

#[tokio::test]
async fn test_invalid_draft_makes_no_request() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut bad = draft();
    bad.title = "  ".to_string();

    let err = habits.create(&test_user(), &bad).await.unwrap_err();
    assert_eq!(err.user_message("Failed to create habit"), "Title is required");
}

#[tokio::test]
async fn test_update_and_patch_bodies() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("PUT"))
        .and(path("/habits/h1"))
        .and(body_partial_json(json!({"title": "Morning Run", "category": "Health & Fitness"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modifiedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/habits/h1"))
        .and(body_partial_json(json!({"reminderTime": "06:30"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let habit: Habit = serde_json::from_value(habit_json("h1", &[])).unwrap();
    habits.update("h1", &HabitUpdate::from(&habit)).await.unwrap();

    let patch = HabitPatch {
        reminder_time: Some("06:30".to_string()),
        ..Default::default()
    };
    habits.patch("h1", &patch).await.unwrap();

    let err = habits.patch("h1", &HabitPatch::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_delete_encodes_id() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    Mock::given(method("DELETE"))
        .and(path("/habits/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deletedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;

    habits.delete("a/b").await.unwrap();
}

#[tokio::test]
async fn test_featured_limits_and_degrades() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    let many: Vec<_> = (0..10).map(|i| habit_json(&format!("h{i}"), &[])).collect();
    Mock::given(method("GET"))
        .and(path("/habits/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(many)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let featured = habits.featured().await;
    assert_eq!(featured.len(), FEATURED_LIMIT);
    assert_eq!(featured[0].id, "h0");

    Mock::given(method("GET"))
        .and(path("/habits/public"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(habits.featured().await.is_empty());
}

#[tokio::test]
async fn test_browse_filters_public_list() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    let mut read = habit_json("h2", &[]);
    read["title"] = json!("Evening reading");
    read["category"] = json!("Learning");

    Mock::given(method("GET"))
        .and(path("/habits/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([habit_json("h1", &[]), read])))
        .mount(&server)
        .await;

    let filter = HabitFilter {
        search: Some("READ".to_string()),
        category: None,
    };
    let found = habits.browse(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "h2");

    let filter = HabitFilter {
        search: None,
        category: Some(Category::HealthAndFitness),
    };
    let found = habits.browse(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "h1");
}

#[tokio::test]
async fn test_get_session_expired_purges_token() {
    let server = MockServer::start().await;
    let (habits, store) = service(&server);

    Mock::given(method("GET"))
        .and(path("/habits/h1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = habits.get("h1").await.unwrap_err();
    assert!(err.is_session_expired());
    assert_eq!(store.get(keys::TOKEN).unwrap(), None);
}

#[tokio::test]
async fn test_malformed_record_does_not_hide_valid_habits() {
    let server = MockServer::start().await;
    let (habits, _) = service(&server);

    let mut null_category = habit_json("h2", &[]);
    null_category["category"] = json!(null);
    let broken = json!({"_id": "h3", "title": ["not", "a", "title"]});

    Mock::given(method("GET"))
        .and(path("/habits/public"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            habit_json("h1", &[]),
            null_category,
            broken,
        ])))
        .mount(&server)
        .await;

    let public = habits.list_public().await.unwrap();
    let ids: Vec<_> = public.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, ["h1", "h2"]);
    assert_eq!(public[1].category, Category::Other);

    assert_eq!(habits.featured().await.len(), 2);

    let filter = HabitFilter {
        search: None,
        category: Some(Category::Other),
    };
    let found = habits.browse(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "h2");
}
