use axum::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::dto::play_dto::{
    FeedbackSummary, GuestAnswerRequest, NextQuestion, OpenQuizResponse, PlayAlternative,
    PlayQuestion, QuizSummary, RankingOptInRequest, SubmitAnswerRequest,
};
use crate::dto::quiz_dto::{
    AddArticlePayload, AlternativePayload, CreateQuestionPayload, CreateQuizPayload,
    UpdateQuestionPayload, UpdateQuizPayload,
};
use crate::models::{
    article::Article,
    question::{Alternative, Question},
    quiz::Quiz,
    user::{LeaderboardEntry, Role, User},
};
use crate::routes::{admin, health, public, quiz};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        quiz::next_question,
        quiz::submit_answer,
        quiz::summary,
        quiz::articles,
        quiz::leaderboard,
        quiz::set_ranking,
        quiz::assign_username,
        public::open_quiz,
        public::question,
        public::submit_answer,
        admin::create_default_quiz,
        admin::create_quiz,
        admin::list_quizzes,
        admin::get_quiz,
        admin::update_quiz,
        admin::delete_quiz,
        admin::add_question,
        admin::update_question,
        admin::add_article,
        admin::remove_article,
    ),
    components(schemas(
        Quiz,
        Question,
        Alternative,
        Article,
        User,
        Role,
        LeaderboardEntry,
        PlayQuestion,
        PlayAlternative,
        NextQuestion,
        FeedbackSummary,
        QuizSummary,
        OpenQuizResponse,
        SubmitAnswerRequest,
        GuestAnswerRequest,
        RankingOptInRequest,
        CreateQuizPayload,
        UpdateQuizPayload,
        AlternativePayload,
        CreateQuestionPayload,
        UpdateQuestionPayload,
        AddArticlePayload,
    )),
    modifiers(&BearerAuth),
    tags((name = "newsquiz", description = "News quiz API"))
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
