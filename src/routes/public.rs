use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    database::QuizStore,
    dto::play_dto::{
        FeedbackSummary, GuestAnswerRequest, NextQuestion, OpenQuizResponse, QuestionIdQuery,
        QuestionNumberQuery,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/public/open-quiz",
    responses(
        (status = 200, description = "The quiz guests can play right now", body = OpenQuizResponse),
        (status = 404, description = "No quiz is open")
    )
)]
#[axum::debug_handler]
pub async fn open_quiz(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let quiz = state.open_quiz_service.open_quiz().await?;
    let total = state.store.questions_by_quiz(quiz.id).await?.len();
    Ok(Json(OpenQuizResponse::new(quiz, total)))
}

#[utoipa::path(
    get,
    path = "/api/v1/public/question",
    params(
        ("quiz-id" = Uuid, Query, description = "Open quiz ID"),
        ("current-question" = u32, Query, description = "1-based question number")
    ),
    responses(
        (status = 200, description = "Question at the given position", body = NextQuestion),
        (status = 400, description = "Question number below 1"),
        (status = 404, description = "Quiz is not open or has no such question")
    )
)]
#[axum::debug_handler]
pub async fn question(
    State(state): State<AppState>,
    Query(query): Query<QuestionNumberQuery>,
) -> Result<impl IntoResponse> {
    let question = state
        .progression_service
        .question_by_number(query.quiz_id, query.current_question)
        .await?;
    Ok(Json(question))
}

#[utoipa::path(
    post,
    path = "/api/v1/public/user-answer",
    params(("question-id" = Uuid, Query, description = "Question ID")),
    request_body = GuestAnswerRequest,
    responses(
        (status = 200, description = "Graded, not recorded", body = FeedbackSummary),
        (status = 400, description = "Alternative does not belong to the question"),
        (status = 403, description = "Question is not part of the open quiz"),
        (status = 404, description = "Unknown question, alternative or no open quiz")
    )
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Query(query): Query<QuestionIdQuery>,
    Json(payload): Json<GuestAnswerRequest>,
) -> Result<impl IntoResponse> {
    let feedback = state
        .scoring_service
        .submit_guest_answer(
            query.question_id,
            payload.answer_id,
            payload.last_question_presented_at,
        )
        .await?;
    Ok(Json(feedback))
}
