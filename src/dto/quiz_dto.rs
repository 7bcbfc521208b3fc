use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{NewAlternative, NewQuestion, QuestionChanges, DEFAULT_POINTS};
use crate::models::quiz::{NewQuiz, QuizChanges};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuizPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url)]
    pub image_url: Option<String>,
    pub available_from: DateTime<Utc>,
    pub available_to: DateTime<Utc>,
    #[serde(default)]
    pub published: bool,
}

impl From<CreateQuizPayload> for NewQuiz {
    fn from(p: CreateQuizPayload) -> Self {
        Self {
            title: p.title,
            image_url: p.image_url,
            available_from: p.available_from,
            available_to: p.available_to,
            published: p.published,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuizPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub remove_image: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub published: Option<bool>,
}

impl From<UpdateQuizPayload> for QuizChanges {
    fn from(p: UpdateQuizPayload) -> Self {
        Self {
            title: p.title,
            image_url: p.image_url,
            remove_image: p.remove_image,
            available_from: p.available_from,
            available_to: p.available_to,
            published: p.published,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AlternativePayload {
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1))]
    pub text: String,
    pub article_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub points: Option<i32>,
    #[validate(length(min = 2), nested)]
    pub alternatives: Vec<AlternativePayload>,
}

impl From<CreateQuestionPayload> for NewQuestion {
    fn from(p: CreateQuestionPayload) -> Self {
        Self {
            text: p.text,
            article_id: p.article_id,
            points: p.points.unwrap_or(DEFAULT_POINTS),
            alternatives: p
                .alternatives
                .into_iter()
                .map(|a| NewAlternative {
                    text: a.text,
                    is_correct: a.is_correct,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionPayload {
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(range(min = 0))]
    pub points: Option<i32>,
    pub article_id: Option<Uuid>,
    #[serde(default)]
    pub remove_article: bool,
}

impl From<UpdateQuestionPayload> for QuestionChanges {
    fn from(p: UpdateQuestionPayload) -> Self {
        Self {
            text: p.text,
            points: p.points,
            article_id: p.article_id,
            remove_article: p.remove_article,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddArticlePayload {
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizListQuery {
    pub published: Option<bool>,
}
