use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::answer::Answer;
use crate::models::article::{Article, NewArticle};
use crate::models::question::{Alternative, NewQuestion, Question, QuestionChanges};
use crate::models::quiz::{NewQuiz, Quiz, QuizChanges, QuizFilter};
use crate::models::user::{LeaderboardEntry, NewUser, User};

/// Everything the quiz services need from persistence.
///
/// Lookups return `Ok(None)` for missing rows; soft-deleted quizzes (and the
/// questions hanging off them) are treated as missing. Implementations must
/// enforce two rules atomically, independent of callers:
///
/// * at most one [`Answer`] per `(user, question)`; a second insert fails with
///   [`crate::error::Error::QuestionAlreadyAnswered`] and writes nothing.
/// * [`QuizStore::insert_question`] assigns `arrangement = max + 1` within the
///   quiz, so arrangements stay `1..=N` under concurrent inserts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz>;
    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>>;
    async fn list_quizzes(&self, filter: QuizFilter) -> Result<Vec<Quiz>>;
    async fn update_quiz(&self, id: Uuid, changes: QuizChanges) -> Result<Option<Quiz>>;
    /// Returns `false` when no live quiz had this id.
    async fn soft_delete_quiz(&self, id: Uuid) -> Result<bool>;
    /// Published, non-deleted quizzes whose window contains `at`.
    async fn open_quizzes(&self, at: DateTime<Utc>) -> Result<Vec<Quiz>>;

    async fn insert_question(&self, quiz_id: Uuid, question: NewQuestion) -> Result<Question>;
    async fn update_question(&self, id: Uuid, changes: QuestionChanges) -> Result<Option<Question>>;
    async fn get_question(&self, id: Uuid) -> Result<Option<Question>>;
    /// Ordered by arrangement; alternatives in insertion order.
    async fn questions_by_quiz(&self, quiz_id: Uuid) -> Result<Vec<Question>>;
    async fn get_alternative(&self, id: Uuid) -> Result<Option<Alternative>>;

    async fn insert_answer(&self, user_id: Uuid, question_id: Uuid, alternative_id: Uuid) -> Result<Answer>;
    async fn answered_question_ids(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<Uuid>>;
    async fn answers_by_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<Answer>>;

    async fn create_article(&self, article: NewArticle) -> Result<Article>;
    async fn get_article(&self, id: Uuid) -> Result<Option<Article>>;
    async fn find_article_by_url(&self, url: String) -> Result<Option<Article>>;
    async fn articles_by_quiz(&self, quiz_id: Uuid) -> Result<Vec<Article>>;
    /// Returns `false` when the article was already linked to the quiz.
    async fn add_article_to_quiz(&self, article_id: Uuid, quiz_id: Uuid) -> Result<bool>;
    /// Returns `false` when there was no such link.
    async fn remove_article_from_quiz(&self, article_id: Uuid, quiz_id: Uuid) -> Result<bool>;

    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    async fn set_ranking_opt_in(&self, user_id: Uuid, opt_in: bool) -> Result<Option<User>>;
    /// Usernames are unique across users; a taken name fails with
    /// [`crate::error::Error::Conflict`] and leaves the user untouched.
    async fn set_username(&self, user_id: Uuid, username: String) -> Result<Option<User>>;
    /// Opted-in users ordered by total awarded points, highest first.
    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>>;
}
