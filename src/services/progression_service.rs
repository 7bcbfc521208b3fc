use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::dto::play_dto::NextQuestion;
use crate::error::{Error, Result};
use crate::services::open_quiz_service::OpenQuizService;

/// Works out where a participant is in a quiz. Read-only: progress is derived
/// from the answer ledger every time.
#[derive(Clone)]
pub struct ProgressionService {
    store: Arc<dyn QuizStore>,
    open_quiz: OpenQuizService,
}

impl ProgressionService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self {
            open_quiz: OpenQuizService::new(store.clone()),
            store,
        }
    }

    /// First question, in arrangement order, that `user_id` has not answered.
    pub async fn next_question(&self, user_id: Uuid, quiz_id: Uuid) -> Result<NextQuestion> {
        if self.store.get_quiz(quiz_id).await?.is_none() {
            return Err(Error::NoSuchQuiz);
        }

        let questions = self.store.questions_by_quiz(quiz_id).await?;
        // Deleted quizzes list no questions; tell that apart from a finished one.
        if questions.is_empty() && self.store.get_quiz(quiz_id).await?.is_none() {
            return Err(Error::NoSuchQuiz);
        }
        let answered: HashSet<Uuid> = self
            .store
            .answered_question_ids(user_id, quiz_id)
            .await?
            .into_iter()
            .collect();

        let total = questions.len();
        let (index, question) = questions
            .into_iter()
            .enumerate()
            .find(|(_, q)| !answered.contains(&q.id))
            .ok_or(Error::NoMoreQuestions)?;

        tracing::debug!(%user_id, %quiz_id, position = index + 1, total, "resolved next question");
        Ok(NextQuestion {
            question: question.into(),
            position: index + 1,
            total,
        })
    }

    /// Guest variant: no ledger, the client tracks its own position. Only the
    /// currently open quiz can be read.
    pub async fn question_by_number(&self, quiz_id: Uuid, number: u32) -> Result<NextQuestion> {
        let open_quiz_id = self.open_quiz.open_quiz_id().await?;
        if quiz_id != open_quiz_id {
            return Err(Error::NoSuchQuiz);
        }
        if number < 1 {
            return Err(Error::BadRequest("Question number must be at least 1".to_string()));
        }

        let questions = self.store.questions_by_quiz(quiz_id).await?;
        let total = questions.len();
        let question = questions
            .into_iter()
            .find(|q| i64::from(q.arrangement) == i64::from(number))
            .ok_or_else(|| Error::NotFound("No question with the given number".to_string()))?;

        Ok(NextQuestion {
            question: question.into(),
            position: number as usize,
            total,
        })
    }
}
