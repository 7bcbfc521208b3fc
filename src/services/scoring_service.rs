use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::dto::play_dto::{FeedbackSummary, QuizSummary};
use crate::error::{Error, Result};
use crate::models::question::{Alternative, Question};
use crate::services::grading_service::GradingService;
use crate::services::open_quiz_service::OpenQuizService;

#[derive(Clone)]
pub struct ScoringService {
    store: Arc<dyn QuizStore>,
    open_quiz: OpenQuizService,
}

impl ScoringService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self {
            open_quiz: OpenQuizService::new(store.clone()),
            store,
        }
    }

    async fn question_and_alternative(
        &self,
        question_id: Uuid,
        alternative_id: Uuid,
    ) -> Result<(Question, Alternative)> {
        let question = self
            .store
            .get_question(question_id)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;
        let alternative = self
            .store
            .get_alternative(alternative_id)
            .await?
            .ok_or_else(|| Error::NotFound("Answer alternative not found".to_string()))?;
        if alternative.question_id != question.id {
            return Err(Error::BadRequest(
                "Answer alternative does not belong to the question".to_string(),
            ));
        }
        Ok((question, alternative))
    }

    /// Records the answer in the ledger and grades it. The store rejects a
    /// second answer to the same question, so a retry can never re-score.
    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        alternative_id: Uuid,
    ) -> Result<FeedbackSummary> {
        let (question, alternative) = self
            .question_and_alternative(question_id, alternative_id)
            .await?;

        if let Err(e) = self
            .store
            .insert_answer(user_id, question.id, alternative.id)
            .await
        {
            if matches!(e, Error::QuestionAlreadyAnswered) {
                tracing::info!(%user_id, %question_id, "duplicate answer rejected");
            }
            return Err(e);
        }

        let feedback = GradingService::feedback(&question, &alternative);
        tracing::info!(
            %user_id,
            %question_id,
            is_correct = feedback.is_correct,
            points = feedback.points_awarded,
            "answer recorded"
        );
        Ok(feedback)
    }

    /// Grades a guest answer without touching the ledger. Guests may only
    /// answer questions of the currently open quiz.
    pub async fn submit_guest_answer(
        &self,
        question_id: Uuid,
        alternative_id: Uuid,
        presented_at: DateTime<Utc>,
    ) -> Result<FeedbackSummary> {
        let open_quiz_id = self.open_quiz.open_quiz_id().await?;
        let (question, alternative) = self
            .question_and_alternative(question_id, alternative_id)
            .await?;
        if question.quiz_id != open_quiz_id {
            return Err(Error::Forbidden(
                "Cannot answer question in non-open quiz without being authenticated".to_string(),
            ));
        }

        let feedback = GradingService::feedback(&question, &alternative);
        let response_ms = (Utc::now() - presented_at).num_milliseconds();
        tracing::info!(
            %question_id,
            is_correct = feedback.is_correct,
            response_ms,
            "guest answer graded"
        );
        Ok(feedback)
    }

    pub async fn quiz_summary(&self, user_id: Uuid, quiz_id: Uuid) -> Result<QuizSummary> {
        let quiz = self
            .store
            .get_quiz(quiz_id)
            .await?
            .ok_or(Error::NoSuchQuiz)?;
        let questions = self.store.questions_by_quiz(quiz_id).await?;
        let answers = self.store.answers_by_quiz(user_id, quiz_id).await?;

        let chosen: HashMap<Uuid, Uuid> = answers
            .iter()
            .map(|a| (a.question_id, a.alternative_id))
            .collect();
        // Arrangement order, not answer order.
        let mut answered = Vec::with_capacity(chosen.len());
        for question in &questions {
            let Some(alternative_id) = chosen.get(&question.id) else {
                continue;
            };
            let Some(alternative) = question.alternative(*alternative_id) else {
                tracing::warn!(question_id = %question.id, "answer references unknown alternative");
                continue;
            };
            answered.push(GradingService::feedback(question, alternative));
        }

        let total_points = answered.iter().map(|f| i64::from(f.points_awarded)).sum();
        let max_points = questions.iter().map(|q| i64::from(q.points)).sum();
        let completed = !questions.is_empty() && answered.len() == questions.len();

        Ok(QuizSummary {
            quiz_id: quiz.id,
            title: quiz.title,
            answered,
            total_points,
            max_points,
            total_questions: questions.len(),
            completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::store::MockQuizStore;
    use crate::database::InMemoryStore;
    use crate::models::question::{NewAlternative, NewQuestion};
    use crate::models::quiz::NewQuiz;
    use crate::models::user::{NewUser, Role};
    use chrono::Duration;

    async fn seeded(published: bool) -> (Arc<InMemoryStore>, Vec<Question>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let quiz = store
            .create_quiz(NewQuiz {
                title: "Week 12".into(),
                image_url: None,
                available_from: now - Duration::hours(1),
                available_to: now + Duration::days(1),
                published,
            })
            .await
            .unwrap();

        let mut questions = Vec::new();
        for (points, correct) in [(5, 0usize), (10, 2usize)] {
            let alternatives = ["A", "B", "C"]
                .iter()
                .enumerate()
                .map(|(i, text)| NewAlternative {
                    text: text.to_string(),
                    is_correct: i == correct,
                })
                .collect();
            let q = store
                .insert_question(
                    quiz.id,
                    NewQuestion {
                        text: format!("Worth {points}"),
                        article_id: None,
                        points,
                        alternatives,
                    },
                )
                .await
                .unwrap();
            questions.push(q);
        }

        let user = store
            .create_user(NewUser {
                id: Uuid::new_v4(),
                email: "reader@example.com".into(),
                username: None,
                role: Role::User,
            })
            .await
            .unwrap();
        (store, questions, user.id)
    }

    #[tokio::test]
    async fn correct_and_wrong_answers_are_scored_and_summarised() {
        let (store, questions, user_id) = seeded(true).await;
        let service = ScoringService::new(store.clone());

        let first = service
            .submit_answer(user_id, questions[0].id, questions[0].alternatives[0].id)
            .await
            .unwrap();
        assert!(first.is_correct);
        assert_eq!(first.points_awarded, 5);

        let second = service
            .submit_answer(user_id, questions[1].id, questions[1].alternatives[1].id)
            .await
            .unwrap();
        assert!(!second.is_correct);
        assert_eq!(second.points_awarded, 0);
        assert_eq!(second.correct_alternative_id, Some(questions[1].alternatives[2].id));

        let summary = service
            .quiz_summary(user_id, questions[0].quiz_id)
            .await
            .unwrap();
        assert_eq!(summary.total_points, 5);
        assert_eq!(summary.max_points, 15);
        assert_eq!(summary.answered, vec![first, second]);
        assert!(summary.completed);
    }

    #[tokio::test]
    async fn resubmission_is_rejected_and_score_unchanged() {
        let (store, questions, user_id) = seeded(true).await;
        let service = ScoringService::new(store.clone());
        let q = &questions[0];

        service
            .submit_answer(user_id, q.id, q.alternatives[1].id)
            .await
            .unwrap();
        let again = service
            .submit_answer(user_id, q.id, q.alternatives[0].id)
            .await;
        assert!(matches!(again, Err(Error::QuestionAlreadyAnswered)));

        let summary = service.quiz_summary(user_id, q.quiz_id).await.unwrap();
        assert_eq!(summary.total_points, 0);
        assert_eq!(summary.answered.len(), 1);
        assert!(!summary.completed);
    }

    #[tokio::test]
    async fn alternative_from_another_question_is_rejected() {
        let (store, questions, user_id) = seeded(true).await;
        let service = ScoringService::new(store.clone());

        let result = service
            .submit_answer(user_id, questions[0].id, questions[1].alternatives[0].id)
            .await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert!(store
            .answered_question_ids(user_id, questions[0].quiz_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn guest_answers_are_graded_but_not_recorded() {
        let (store, questions, user_id) = seeded(true).await;
        let service = ScoringService::new(store.clone());
        let q = &questions[1];

        let feedback = service
            .submit_guest_answer(q.id, q.alternatives[2].id, Utc::now() - Duration::seconds(4))
            .await
            .unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.points_awarded, 10);

        // Guest play leaves no trace for any user.
        let summary = service.quiz_summary(user_id, q.quiz_id).await.unwrap();
        assert!(summary.answered.is_empty());
    }

    #[tokio::test]
    async fn guest_cannot_answer_outside_open_quiz() {
        let (store, questions, _) = seeded(true).await;
        let now = Utc::now();
        let other = store
            .create_quiz(NewQuiz {
                title: "Old".into(),
                image_url: None,
                available_from: now - Duration::days(14),
                available_to: now - Duration::days(7),
                published: true,
            })
            .await
            .unwrap();
        let stale = store
            .insert_question(
                other.id,
                NewQuestion {
                    text: "Stale".into(),
                    article_id: None,
                    points: 10,
                    alternatives: vec![
                        NewAlternative { text: "yes".into(), is_correct: true },
                        NewAlternative { text: "no".into(), is_correct: false },
                    ],
                },
            )
            .await
            .unwrap();

        let service = ScoringService::new(store.clone());
        let result = service
            .submit_guest_answer(stale.id, stale.alternatives[0].id, now)
            .await;
        assert!(matches!(result, Err(Error::Forbidden(_))));

        let open = service
            .submit_guest_answer(questions[0].id, questions[0].alternatives[0].id, now)
            .await;
        assert!(open.is_ok());
    }

    #[tokio::test]
    async fn guest_answer_without_open_quiz_fails() {
        let (store, questions, _) = seeded(false).await;
        let service = ScoringService::new(store);
        let q = &questions[0];
        let result = service
            .submit_guest_answer(q.id, q.alternatives[0].id, Utc::now())
            .await;
        assert!(matches!(result, Err(Error::NoOpenQuiz)));
    }

    #[tokio::test]
    async fn store_failures_propagate_without_feedback() {
        let question_id = Uuid::new_v4();
        let alternative_id = Uuid::new_v4();

        let mut store = MockQuizStore::new();
        store.expect_get_question().returning(move |id| {
            Ok(Some(Question {
                id,
                quiz_id: Uuid::new_v4(),
                text: "Q".into(),
                arrangement: 1,
                article_id: None,
                points: 10,
                alternatives: vec![Alternative {
                    id: alternative_id,
                    question_id: id,
                    text: "A".into(),
                    is_correct: true,
                }],
            }))
        });
        store.expect_get_alternative().returning(move |id| {
            Ok(Some(Alternative {
                id,
                question_id,
                text: "A".into(),
                is_correct: true,
            }))
        });
        store
            .expect_insert_answer()
            .times(1)
            .returning(|_, _, _| Err(Error::Database(sqlx::Error::PoolTimedOut)));

        let service = ScoringService::new(Arc::new(store));
        let result = service
            .submit_answer(Uuid::new_v4(), question_id, alternative_id)
            .await;
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
