mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{with_query, TestApp};

const ORDERS: &str = "/api/orders";

#[tokio::test]
async fn orders_require_authentication() {
    let app = TestApp::new();
    let (status, _) = app.get(ORDERS, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn regular_user_books_tickets() {
    let app = TestApp::new();
    let (_, token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;

    let data = json!({"tickets": [
        {"row": 1, "seat": 1, "movie_session": session.id},
        {"row": 1, "seat": 2, "movie_session": session.id},
    ]});
    let (status, body) = app.post(ORDERS, Some(&token), data).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);
    assert_eq!(body["tickets"][0]["movie_session"], json!(session.id));

    let (_, sessions) = app.get("/api/movie_sessions", Some(&token)).await;
    assert_eq!(sessions[0]["tickets_available"], json!(398));
}

#[tokio::test]
async fn place_outside_hall_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;

    for (row, seat) in [(21, 1), (1, 21), (0, 5)] {
        let data = json!({"tickets": [{"row": row, "seat": seat, "movie_session": session.id}]});
        let (status, _) = app.post(ORDERS, Some(&token), data).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "row {row} seat {seat}");
    }

    let taken = app.state.store.taken_places(session.id).await.unwrap();
    assert!(taken.is_empty());
}

#[tokio::test]
async fn taken_place_cannot_be_booked_again() {
    let app = TestApp::new();
    let (owner, _) = app.create_user(false).await;
    let (_, token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;
    app.sample_ticket(&owner, &session, 4, 4).await;

    let data = json!({"tickets": [
        {"row": 4, "seat": 5, "movie_session": session.id},
        {"row": 4, "seat": 4, "movie_session": session.id},
    ]});
    let (status, body) = app.post(ORDERS, Some(&token), data).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("CONFLICT"));
    assert_eq!(app.state.store.taken_places(session.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_places_in_one_order_are_rejected() {
    let app = TestApp::new();
    let (_, token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;

    let ticket = json!({"row": 2, "seat": 2, "movie_session": session.id});
    let (status, _) = app.post(ORDERS, Some(&token), json!({"tickets": [ticket.clone(), ticket]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_and_invalid_tickets_are_rejected() {
    let app = TestApp::new();
    let (_, token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;

    let (status, body) = app.post(ORDERS, Some(&token), json!({"tickets": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));

    // nested validate: row >= 1
    let data = json!({"tickets": [{"row": 0, "seat": 1, "movie_session": session.id}]});
    let (status, body) = app.post(ORDERS, Some(&token), data).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("VALIDATION_ERROR"));
    assert!(app.state.store.taken_places(session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.create_user(false).await;

    let data = json!({"tickets": [{"row": 1, "seat": 1, "movie_session": 77}]});
    let (status, _) = app.post(ORDERS, Some(&token), data).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn orders_are_visible_only_to_owner() {
    let app = TestApp::new();
    let (alice, alice_token) = app.create_user(false).await;
    let (_, bob_token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;
    let order = app.sample_ticket(&alice, &session, 1, 1).await;

    let (status, body) = app.get(ORDERS, Some(&alice_token)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], json!(order.id));
    assert_eq!(orders[0]["tickets"][0]["movie_session"]["movie_title"], json!("Sample movie"));
    assert_eq!(orders[0]["tickets"][0]["movie_session"]["cinema_hall_name"], json!("Blue"));

    let (_, body) = app.get(ORDERS, Some(&bob_token)).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn orders_are_paginated_newest_first() {
    let app = TestApp::new();
    let (user, token) = app.create_user(false).await;
    let movie = app.sample_movie("Sample movie").await;
    let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;
    let mut ids = Vec::new();
    for seat in 1..=3 {
        ids.push(app.sample_ticket(&user, &session, 1, seat).await.id);
    }

    let (_, first_page) = app
        .get(&with_query(ORDERS, &[("page", "1"), ("page_size", "2")]), Some(&token))
        .await;
    let (_, second_page) = app
        .get(&with_query(ORDERS, &[("page", "2"), ("page_size", "2")]), Some(&token))
        .await;

    let first: Vec<i64> = first_page.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect();
    let second: Vec<i64> = second_page.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect();
    assert_eq!(first, vec![ids[2], ids[1]]);
    assert_eq!(second, vec![ids[0]]);
}
