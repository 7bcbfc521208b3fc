use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::Question;
use crate::models::quiz::Quiz;

/// Alternative as shown to a player: the correctness flag is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayAlternative {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlayQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    pub arrangement: i32,
    pub article_id: Option<Uuid>,
    pub points: i32,
    pub alternatives: Vec<PlayAlternative>,
}

impl From<Question> for PlayQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            quiz_id: q.quiz_id,
            text: q.text,
            arrangement: q.arrangement,
            article_id: q.article_id,
            points: q.points,
            alternatives: q
                .alternatives
                .into_iter()
                .map(|a| PlayAlternative { id: a.id, text: a.text })
                .collect(),
        }
    }
}

/// Question to present next, with its 1-based position out of `total`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NextQuestion {
    pub question: PlayQuestion,
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackSummary {
    pub question_id: Uuid,
    pub question_text: String,
    pub max_points: i32,
    pub chosen_alternative_id: Uuid,
    pub chosen_alternative_text: String,
    pub correct_alternative_id: Option<Uuid>,
    pub is_correct: bool,
    pub points_awarded: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizSummary {
    pub quiz_id: Uuid,
    pub title: String,
    pub answered: Vec<FeedbackSummary>,
    pub total_points: i64,
    pub max_points: i64,
    pub total_questions: usize,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenQuizResponse {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub available_from: DateTime<Utc>,
    pub available_to: DateTime<Utc>,
    pub total_questions: usize,
}

impl OpenQuizResponse {
    pub fn new(quiz: Quiz, total_questions: usize) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            image_url: quiz.image_url,
            available_from: quiz.available_from,
            available_to: quiz.available_to,
            total_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    pub answer_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GuestAnswerRequest {
    pub answer_id: Uuid,
    pub last_question_presented_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankingOptInRequest {
    pub opt_in: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizIdQuery {
    #[serde(rename = "quiz-id")]
    pub quiz_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionIdQuery {
    #[serde(rename = "question-id")]
    pub question_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionNumberQuery {
    #[serde(rename = "quiz-id")]
    pub quiz_id: Uuid,
    #[serde(rename = "current-question")]
    pub current_question: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}
