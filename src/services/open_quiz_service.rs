use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::error::{Error, Result};
use crate::models::quiz::Quiz;

/// Resolves the single quiz guests are allowed to play.
#[derive(Clone)]
pub struct OpenQuizService {
    store: Arc<dyn QuizStore>,
}

impl OpenQuizService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    pub async fn open_quiz(&self) -> Result<Quiz> {
        self.open_quiz_at(Utc::now()).await
    }

    pub async fn open_quiz_id(&self) -> Result<Uuid> {
        Ok(self.open_quiz().await?.id)
    }

    pub async fn open_quiz_id_at(&self, now: DateTime<Utc>) -> Result<Uuid> {
        Ok(self.open_quiz_at(now).await?.id)
    }

    /// Several overlapping windows should not exist, but if they do the most
    /// recently opened quiz wins, ties broken by id.
    pub async fn open_quiz_at(&self, now: DateTime<Utc>) -> Result<Quiz> {
        let candidates = self.store.open_quizzes(now).await?;
        if candidates.len() > 1 {
            tracing::warn!(count = candidates.len(), "multiple quizzes open at the same time");
        }
        candidates
            .into_iter()
            .filter(|q| q.is_open_at(now))
            .max_by(|a, b| {
                a.available_from
                    .cmp(&b.available_from)
                    .then_with(|| b.id.cmp(&a.id))
            })
            .ok_or(Error::NoOpenQuiz)
    }
}
