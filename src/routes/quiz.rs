use axum::{
    extract::{Extension, Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::play_dto::{
        FeedbackSummary, LeaderboardQuery, NextQuestion, QuestionIdQuery, QuizIdQuery,
        QuizSummary, RankingOptInRequest, SubmitAnswerRequest,
    },
    error::Result,
    models::{article::Article, user::LeaderboardEntry, user::User},
    services::user_service::Identity,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/quiz/next-question",
    params(("quiz-id" = Uuid, Query, description = "Quiz ID")),
    responses(
        (status = 200, description = "First unanswered question", body = NextQuestion),
        (status = 404, description = "Unknown quiz or no more questions")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn next_question(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<QuizIdQuery>,
) -> Result<impl IntoResponse> {
    let next = state
        .progression_service
        .next_question(identity.id, query.quiz_id)
        .await?;
    Ok(Json(next))
}

#[utoipa::path(
    post,
    path = "/api/v1/quiz/user-answer",
    params(("question-id" = Uuid, Query, description = "Question ID")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = FeedbackSummary),
        (status = 400, description = "Alternative does not belong to the question"),
        (status = 404, description = "Unknown question or alternative"),
        (status = 409, description = "Question already answered")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<QuestionIdQuery>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse> {
    let feedback = state
        .scoring_service
        .submit_answer(identity.id, query.question_id, payload.answer_id)
        .await?;
    Ok(Json(feedback))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz/summary",
    params(("quiz-id" = Uuid, Query, description = "Quiz ID")),
    responses(
        (status = 200, description = "Answers and score so far", body = QuizSummary),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<QuizIdQuery>,
) -> Result<impl IntoResponse> {
    let summary = state
        .scoring_service
        .quiz_summary(identity.id, query.quiz_id)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz/articles",
    params(("quiz-id" = Uuid, Query, description = "Quiz ID")),
    responses(
        (status = 200, description = "Articles the quiz is based on", body = [Article]),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn articles(
    State(state): State<AppState>,
    Query(query): Query<QuizIdQuery>,
) -> Result<impl IntoResponse> {
    let articles = state.catalog_service.articles(query.quiz_id).await?;
    Ok(Json(articles))
}

#[utoipa::path(
    get,
    path = "/api/v1/quiz/leaderboard",
    params(("limit" = Option<i64>, Query, description = "Entries to return, 1 to 100")),
    responses((status = 200, description = "Top opted-in players", body = [LeaderboardEntry])),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse> {
    let entries = state.leaderboard_service.leaderboard(query.limit).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    patch,
    path = "/api/v1/quiz/me/ranking",
    request_body = RankingOptInRequest,
    responses((status = 200, description = "Preference saved", body = User)),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn set_ranking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<RankingOptInRequest>,
) -> Result<impl IntoResponse> {
    let user = state
        .leaderboard_service
        .set_ranking_opt_in(identity.id, payload.opt_in)
        .await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/quiz/me/username",
    responses(
        (status = 200, description = "New random username assigned", body = User),
        (status = 409, description = "No free username found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn assign_username(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .assign_random_username(identity.id)
        .await?;
    Ok(Json(user))
}
