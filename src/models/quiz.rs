use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::Question;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub image_url: Option<String>,
    pub available_from: DateTime<Utc>,
    pub available_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub published: bool,
    pub is_deleted: bool,
    #[sqlx(skip)]
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Guests may only play a quiz that is published, not deleted and whose
    /// half-open window `[available_from, available_to)` contains `now`.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.published
            && !self.is_deleted
            && self.available_from <= now
            && now < self.available_to
    }
}

#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub image_url: Option<String>,
    pub available_from: DateTime<Utc>,
    pub available_to: DateTime<Utc>,
    pub published: bool,
}

impl NewQuiz {
    /// Unpublished quiz named after the current ISO week, open for one week.
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            title: format!("Quiz: Week {}", now.iso_week().week()),
            image_url: None,
            available_from: now,
            available_to: now + Duration::days(7),
            published: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuizChanges {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub remove_image: bool,
    pub available_from: Option<DateTime<Utc>>,
    pub available_to: Option<DateTime<Utc>>,
    pub published: Option<bool>,
}

impl QuizChanges {
    pub fn apply(&self, quiz: &mut Quiz) {
        if let Some(title) = &self.title {
            quiz.title = title.clone();
        }
        if self.remove_image {
            quiz.image_url = None;
        } else if let Some(image_url) = &self.image_url {
            quiz.image_url = Some(image_url.clone());
        }
        if let Some(from) = self.available_from {
            quiz.available_from = from;
        }
        if let Some(to) = self.available_to {
            quiz.available_to = to;
        }
        if let Some(published) = self.published {
            quiz.published = published;
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QuizFilter {
    pub published: Option<bool>,
}
