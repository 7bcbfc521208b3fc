mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use common::{send, setup_app, token};

#[tokio::test]
async fn admin_authoring_end_to_end() {
    let (app, _) = setup_app(1000);
    let admin = token(Uuid::new_v4(), "quiz_admin");

    let (status, body) = send(&app, "POST", "/api/v1/admin/quiz/create-new", Some(&admin), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["published"], false);
    assert!(body["title"].as_str().unwrap_or_default().starts_with("Quiz: Week "));
    let quiz_id = body["id"].as_str().unwrap().to_string();

    let (status, article) = send(
        &app,
        "POST",
        &format!("/api/v1/admin/quiz/{}/articles", quiz_id),
        Some(&admin),
        Some(json!({ "url": "https://news.example/elections", "title": "Election night" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/admin/quiz/{}/articles", quiz_id),
        Some(&admin),
        Some(json!({ "url": "https://news.example/elections", "title": "Election night" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for text in ["First", "Second"] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/admin/quiz/{}/questions", quiz_id),
            Some(&admin),
            Some(json!({
                "text": text,
                "article_id": article["id"],
                "alternatives": [
                    { "text": "yes", "is_correct": true },
                    { "text": "no" }
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["points"], 10);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/admin/quiz/{}", quiz_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][0]["arrangement"], 1);
    assert_eq!(body["questions"][1]["arrangement"], 2);
    assert_eq!(body["questions"][1]["alternatives"][0]["is_correct"], true);

    let now = Utc::now();
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/admin/quiz/{}", quiz_id),
        Some(&admin),
        Some(json!({
            "published": true,
            "available_from": now - Duration::minutes(5),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["published"], true);

    let (status, body) = send(&app, "GET", "/api/v1/public/open-quiz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(quiz_id));

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/admin/quiz/{}", quiz_id),
        Some(&admin),
        Some(json!({ "available_to": now - Duration::days(30) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/admin/quiz/{}/articles/{}", quiz_id, article["id"].as_str().unwrap()),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/admin/quiz/{}", quiz_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/admin/quiz/{}", quiz_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_questions_are_rejected() {
    let (app, _) = setup_app(1000);
    let admin = token(Uuid::new_v4(), "organization_admin");
    let (_, quiz) = send(&app, "POST", "/api/v1/admin/quiz/create-new", Some(&admin), None).await;
    let uri = format!("/api/v1/admin/quiz/{}/questions", quiz["id"].as_str().unwrap());

    let one_alternative = json!({
        "text": "Lonely",
        "alternatives": [{ "text": "only", "is_correct": true }]
    });
    let (status, _) = send(&app, "POST", &uri, Some(&admin), Some(one_alternative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let two_correct = json!({
        "text": "Ambiguous",
        "alternatives": [
            { "text": "a", "is_correct": true },
            { "text": "b", "is_correct": true }
        ]
    });
    let (status, _) = send(&app, "POST", &uri, Some(&admin), Some(two_correct)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plain_users_cannot_author() {
    let (app, _) = setup_app(1000);
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/quiz/create-new",
        Some(&token(Uuid::new_v4(), "user")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send(&app, "GET", "/api/v1/admin/quiz", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (app, _) = setup_app(1000);
    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]
        .get("/api/v1/quiz/user-answer")
        .is_some());
}
