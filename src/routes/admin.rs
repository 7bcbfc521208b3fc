use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::quiz_dto::{
        AddArticlePayload, CreateQuestionPayload, CreateQuizPayload, QuizListQuery,
        UpdateQuestionPayload, UpdateQuizPayload,
    },
    error::Result,
    models::{
        article::{Article, NewArticle},
        question::Question,
        quiz::{Quiz, QuizFilter},
    },
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/admin/quiz/create-new",
    responses((status = 201, description = "Draft quiz for the current week", body = Quiz)),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_default_quiz(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let quiz = state.catalog_service.create_default_quiz().await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/quiz",
    request_body = CreateQuizPayload,
    responses(
        (status = 201, description = "Quiz created", body = Quiz),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.catalog_service.create_quiz(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/quiz",
    params(("published" = Option<bool>, Query, description = "Filter on published flag")),
    responses((status = 200, description = "Quizzes, newest window first", body = [Quiz])),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse> {
    let quizzes = state
        .catalog_service
        .list_quizzes(QuizFilter {
            published: query.published,
        })
        .await?;
    Ok(Json(quizzes))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/quiz/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 200, description = "Quiz with questions and alternatives", body = Quiz),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let quiz = state.catalog_service.get_quiz(id).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/quiz/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = UpdateQuizPayload,
    responses(
        (status = 200, description = "Quiz updated", body = Quiz),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let quiz = state.catalog_service.update_quiz(id, payload.into()).await?;
    Ok(Json(quiz))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/quiz/{id}",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    responses(
        (status = 204, description = "Quiz deleted"),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.catalog_service.delete_quiz(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/quiz/{id}/questions",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question appended", body = Question),
        (status = 400, description = "Invalid question"),
        (status = 404, description = "Quiz or article not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn add_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state
        .catalog_service
        .add_question(id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = UpdateQuestionPayload,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Question or article not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state
        .catalog_service
        .update_question(id, payload.into())
        .await?;
    Ok(Json(question))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/quiz/{id}/articles",
    params(("id" = Uuid, Path, description = "Quiz ID")),
    request_body = AddArticlePayload,
    responses(
        (status = 201, description = "Article linked", body = Article),
        (status = 404, description = "Quiz not found"),
        (status = 409, description = "Article is already in quiz")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn add_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddArticlePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let article = state
        .catalog_service
        .add_article(
            id,
            NewArticle {
                url: payload.url,
                title: payload.title,
                image_url: payload.image_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(article)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/quiz/{id}/articles/{article_id}",
    params(
        ("id" = Uuid, Path, description = "Quiz ID"),
        ("article_id" = Uuid, Path, description = "Article ID")
    ),
    responses(
        (status = 204, description = "Article unlinked"),
        (status = 404, description = "Article is not linked to the quiz")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn remove_article(
    State(state): State<AppState>,
    Path((id, article_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse> {
    state.catalog_service.remove_article(id, article_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
