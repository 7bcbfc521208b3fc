#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use newsquiz_backend::{
    database::InMemoryStore,
    middleware::auth::{encode_token, Claims},
    models::{
        question::{NewAlternative, NewQuestion, Question},
        quiz::{NewQuiz, Quiz},
    },
    routes::build_router,
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";

pub fn init_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/newsquiz_unused");
    env::set_var("JWT_SECRET", JWT_SECRET);
    env::set_var("PUBLIC_RPS", "1000");
    env::set_var("API_RPS", "1000");
    // Every test in the binary sets the same values; only the first call wins.
    let _ = newsquiz_backend::config::init_config();
}

pub fn setup_app(public_rps: u32) -> (Router, AppState) {
    init_env();
    let state = AppState::with_store(Arc::new(InMemoryStore::new()));
    let app = build_router(state.clone(), public_rps, 1000);
    (app, state)
}

pub fn token(user_id: Uuid, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        role: Some(role.to_string()),
        email: Some(format!("{}@example.com", user_id)),
        name: Some("Test Reader".into()),
    };
    encode_token(&claims, JWT_SECRET).expect("sign token")
}

/// Quiz open right now with two questions: the first worth 5 points with
/// "A" correct, the second worth 10 with "C" correct.
pub async fn seed_open_quiz(state: &AppState) -> (Quiz, Vec<Question>) {
    let now = Utc::now();
    let quiz = state
        .catalog_service
        .create_quiz(NewQuiz {
            title: "Week in review".into(),
            image_url: None,
            available_from: now - Duration::hours(1),
            available_to: now + Duration::days(6),
            published: true,
        })
        .await
        .expect("create quiz");

    let mut questions = Vec::new();
    for (text, points, correct) in [("Q1", 5, "A"), ("Q2", 10, "C")] {
        let question = state
            .catalog_service
            .add_question(
                quiz.id,
                NewQuestion {
                    text: text.into(),
                    article_id: None,
                    points,
                    alternatives: ["A", "B", "C"]
                        .iter()
                        .map(|t| NewAlternative {
                            text: t.to_string(),
                            is_correct: *t == correct,
                        })
                        .collect(),
                },
            )
            .await
            .expect("add question");
        questions.push(question);
    }
    (quiz, questions)
}

pub fn alternative_id(question: &Question, text: &str) -> Uuid {
    question
        .alternatives
        .iter()
        .find(|a| a.text == text)
        .map(|a| a.id)
        .expect("alternative")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, body)
}
