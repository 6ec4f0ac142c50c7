//! HTTP API tests driven through the router without a socket

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use numerito::{
    api::{build_app, AppState},
    config::{ScoreStoreConfig, ServerConfig},
    game::Secret,
    registry::SessionRegistry,
    scores::{InMemoryScoreStore, Leaderboard},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> Arc<AppState> {
    let leaderboard = Leaderboard::new(
        Arc::new(InMemoryScoreStore::new()),
        &ScoreStoreConfig::default(),
    );
    Arc::new(AppState::new(SessionRegistry::new(), leaderboard))
}

fn app(state: &Arc<AppState>) -> Router {
    build_app(Arc::clone(state), &ServerConfig::default())
}

fn app_with_origins(state: &Arc<AppState>, origins: &[&str]) -> Router {
    let config = ServerConfig {
        allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        ..ServerConfig::default()
    };
    build_app(Arc::clone(state), &config)
}

fn preflight(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn game_with_secret(state: &Arc<AppState>, secret: &str) -> String {
    state
        .registry
        .create_session_with_secret(Secret::parse(secret).unwrap())
        .unwrap()
}

async fn guess(state: &Arc<AppState>, game_id: &str, guess: &str) -> (StatusCode, Value) {
    send(
        state,
        json_request(
            Method::POST,
            &format!("/api/game/{game_id}/guess"),
            json!({ "guess": guess }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, body) = send(&state, empty_request(Method::GET, "/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "UP", "service": "numerito-game-api" }));
}

#[tokio::test]
async fn test_create_game_and_read_state() {
    let state = test_state();
    let (status, body) = send(&state, empty_request(Method::POST, "/api/game")).await;
    assert_eq!(status, StatusCode::CREATED);
    let game_id = body["gameId"].as_str().unwrap().to_string();
    assert!(!body["message"].as_str().unwrap().is_empty());

    let (status, body) = send(&state, empty_request(Method::GET, &format!("/api/game/{game_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gameId"], game_id.as_str());
    assert_eq!(body["attempts"], 0);
    assert_eq!(body["finished"], false);

    let created_at: DateTime<Utc> = serde_json::from_value(body["createdAt"].clone()).unwrap();
    let age = Utc::now() - created_at;
    assert!(age >= chrono::Duration::zero() && age < chrono::Duration::minutes(1));
}

#[tokio::test]
async fn test_guess_flow_until_win() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");

    let (status, body) = guess(&state, &game_id, "1243").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "bien": 2, "regular": 2, "mal": 0, "win": false, "attemptNumber": 1, "finished": false })
    );

    let (status, body) = guess(&state, &game_id, "1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bien"], 4);
    assert_eq!(body["win"], true);
    assert_eq!(body["attemptNumber"], 2);
    assert_eq!(body["finished"], true);

    let (status, body) = guess(&state, &game_id, "5678").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "GAME_ALREADY_FINISHED");

    let (_, body) = send(&state, empty_request(Method::GET, &format!("/api/game/{game_id}"))).await;
    assert_eq!(body["attempts"], 2);
    assert_eq!(body["finished"], true);
}

#[tokio::test]
async fn test_invalid_guesses_are_rejected_with_rule() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");

    for (raw, rule) in [
        ("0123", "leading_zero"),
        ("1223", "distinct_digits"),
        ("12a4", "digits_only"),
        ("123", "length"),
    ] {
        let (status, body) = guess(&state, &game_id, raw).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "guess {raw}");
        assert_eq!(body["error"]["code"], "INVALID_GUESS");
        assert_eq!(body["error"]["details"]["rule"], rule);
        assert!(body["request_id"].is_string());
    }

    // absent and null guesses hit the presence rule
    for payload in [json!({}), json!({ "guess": null })] {
        let (status, body) = send(
            &state,
            json_request(Method::POST, &format!("/api/game/{game_id}/guess"), payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["rule"], "missing");
    }

    // rejected guesses are never counted
    let (_, body) = send(&state, empty_request(Method::GET, &format!("/api/game/{game_id}"))).await;
    assert_eq!(body["attempts"], 0);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/game/{game_id}/guess"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let state = test_state();

    let (status, body) = guess(&state, "no-such-game", "1234").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "GAME_NOT_FOUND");

    let (status, _) = send(&state, empty_request(Method::GET, "/api/game/no-such-game")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_game() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");
    let uri = format!("/api/game/{game_id}");

    let (status, _) = send(&state, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(state.registry.active_count(), 0);
}

#[tokio::test]
async fn test_scores_round_trip_through_leaderboard() {
    let state = test_state();

    let slow = game_with_secret(&state, "1234");
    guess(&state, &slow, "5678").await;
    guess(&state, &slow, "4321").await;
    guess(&state, &slow, "1234").await;

    let fast = game_with_secret(&state, "9876");
    guess(&state, &fast, "9876").await;

    let (status, body) = send(
        &state,
        json_request(
            Method::POST,
            "/api/scores",
            json!({ "playerName": "Slow", "attempts": 3, "gameId": slow, "timeSeconds": 90 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["playerName"], "Slow");
    assert_eq!(body["attempts"], 3);

    let (status, _) = send(
        &state,
        json_request(
            Method::POST,
            "/api/scores",
            json!({ "playerName": "", "gameId": fast, "timeSeconds": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&state, empty_request(Method::GET, "/api/scores/top?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    let scores = body.as_array().unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0]["playerName"], "Anonymous");
    assert_eq!(scores[0]["attempts"], 1);
    assert_eq!(scores[1]["playerName"], "Slow");

    let (_, body) = send(&state, empty_request(Method::GET, "/api/scores/top?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_score_for_unfinished_or_mismatched_game_is_rejected() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");

    let (status, body) = send(
        &state,
        json_request(
            Method::POST,
            "/api/scores",
            json!({ "playerName": "Early", "gameId": game_id, "timeSeconds": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    guess(&state, &game_id, "1234").await;
    let (status, _) = send(
        &state,
        json_request(
            Method::POST,
            "/api/scores",
            json!({ "playerName": "Liar", "attempts": 1000, "gameId": game_id, "timeSeconds": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &state,
        json_request(
            Method::POST,
            "/api/scores",
            json!({ "playerName": "Ghost", "gameId": "missing", "timeSeconds": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "GAME_NOT_FOUND");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let state = test_state();
    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "trace-me")
        .body(Body::empty())
        .unwrap();
    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me");

    let response = app(&state)
        .oneshot(empty_request(Method::GET, "/api/health"))
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_metrics_endpoint_counts_activity() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");
    send(&state, empty_request(Method::POST, "/api/game")).await;
    guess(&state, &game_id, "0123").await;
    guess(&state, &game_id, "1234").await;

    let response = app(&state)
        .oneshot(empty_request(Method::GET, "/metrics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("numerito_games_created_total 1\n"));
    assert!(text.contains("numerito_guesses_scored_total 1\n"));
    assert!(text.contains("numerito_guesses_rejected_total 1\n"));
    assert!(text.contains("numerito_games_won_total 1\n"));
    assert!(text.contains("numerito_active_games 2\n"));
}

#[tokio::test]
async fn test_second_score_for_same_game_is_a_conflict() {
    let state = test_state();
    let game_id = game_with_secret(&state, "1234");
    guess(&state, &game_id, "1234").await;

    let body = json!({ "playerName": "Ana", "gameId": game_id, "timeSeconds": 7 });
    let (status, _) = send(&state, json_request(Method::POST, "/api/scores", body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    for _ in 0..3 {
        let (status, response) =
            send(&state, json_request(Method::POST, "/api/scores", body.clone())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(response["error"]["code"], "SCORE_ALREADY_RECORDED");
    }

    let (_, top) = send(&state, empty_request(Method::GET, "/api/scores/top")).await;
    assert_eq!(top.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cors_allows_only_configured_origins() {
    let state = test_state();
    // the unparseable entry is dropped, the valid one still applies
    let origins = ["http://a.test", "bad\norigin"];

    let response = app_with_origins(&state, &origins)
        .oneshot(preflight("/api/game", "http://a.test"))
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://a.test"
    );

    let response = app_with_origins(&state, &origins)
        .oneshot(preflight("/api/game", "http://evil.test"))
        .await
        .unwrap();
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    // simple requests follow the same rule
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://evil.test")
        .body(Body::empty())
        .unwrap();
    let response = app_with_origins(&state, &origins).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_cors_wildcard_allows_any_origin() {
    let state = test_state();
    let response = app(&state)
        .oneshot(preflight("/api/game", "http://anywhere.test"))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
