use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_POINTS: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub text: String,
    /// 1-based play position inside the quiz.
    pub arrangement: i32,
    pub article_id: Option<Uuid>,
    pub points: i32,
    #[sqlx(skip)]
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

impl Question {
    pub fn alternative(&self, id: Uuid) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.id == id)
    }

    pub fn correct_alternative(&self) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.is_correct)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Alternative {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub article_id: Option<Uuid>,
    pub points: i32,
    pub alternatives: Vec<NewAlternative>,
}

#[derive(Debug, Clone)]
pub struct NewAlternative {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionChanges {
    pub text: Option<String>,
    pub points: Option<i32>,
    pub article_id: Option<Uuid>,
    pub remove_article: bool,
}

impl QuestionChanges {
    pub fn apply(&self, question: &mut Question) {
        if let Some(text) = &self.text {
            question.text = text.clone();
        }
        if let Some(points) = self.points {
            question.points = points;
        }
        if self.remove_article {
            question.article_id = None;
        } else if let Some(article_id) = self.article_id {
            question.article_id = Some(article_id);
        }
    }
}
