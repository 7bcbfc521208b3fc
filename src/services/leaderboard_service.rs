use std::sync::Arc;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::error::{Error, Result};
use crate::models::user::{LeaderboardEntry, User};

pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct LeaderboardService {
    store: Arc<dyn QuizStore>,
}

impl LeaderboardService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        self.store.leaderboard(limit).await
    }

    pub async fn set_ranking_opt_in(&self, user_id: Uuid, opt_in: bool) -> Result<User> {
        let user = self
            .store
            .set_ranking_opt_in(user_id, opt_in)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        tracing::info!(%user_id, opt_in, "ranking preference updated");
        Ok(user)
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
    use mockall::predicate::eq;

    #[tokio::test]
    async fn limit_defaults_and_is_clamped() {
        let mut store = MockQuizStore::new();
        store
            .expect_leaderboard()
            .with(eq(DEFAULT_LEADERBOARD_LIMIT))
            .times(1)
            .returning(|_| Ok(vec![]));
        store
            .expect_leaderboard()
            .with(eq(MAX_LEADERBOARD_LIMIT))
            .times(1)
            .returning(|_| Ok(vec![]));
        store
            .expect_leaderboard()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = LeaderboardService::new(Arc::new(store));
        service.leaderboard(None).await.unwrap();
        service.leaderboard(Some(5_000)).await.unwrap();
        service.leaderboard(Some(-3)).await.unwrap();
    }

    #[tokio::test]
    async fn opted_out_users_are_hidden() {
        let store = Arc::new(InMemoryStore::new());
        let now = chrono::Utc::now();
        let quiz = store
            .create_quiz(NewQuiz::default_at(now))
            .await
            .unwrap();
        let question = store
            .insert_question(
                quiz.id,
                NewQuestion {
                    text: "Q".into(),
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

        let mut users = Vec::new();
        for name in ["ada", "bob"] {
            let user = store
                .create_user(NewUser {
                    id: Uuid::new_v4(),
                    email: format!("{name}@example.com"),
                    username: Some(name.to_string()),
                    role: Role::User,
                })
                .await
                .unwrap();
            store
                .insert_answer(user.id, question.id, question.alternatives[0].id)
                .await
                .unwrap();
            users.push(user);
        }

        let service = LeaderboardService::new(store.clone());
        assert_eq!(service.leaderboard(None).await.unwrap().len(), 2);

        service.set_ranking_opt_in(users[1].id, false).await.unwrap();
        let board = service.leaderboard(None).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, users[0].id);
        assert_eq!(board[0].total_points, 10);
    }

    #[tokio::test]
    async fn unknown_user_cannot_change_preference() {
        let service = LeaderboardService::new(Arc::new(InMemoryStore::new()));
        assert!(matches!(
            service.set_ranking_opt_in(Uuid::new_v4(), true).await,
            Err(Error::NotFound(_))
        ));
    }
}
