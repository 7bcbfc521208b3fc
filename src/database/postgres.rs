use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::article::{Article, NewArticle};
use crate::models::question::{Alternative, NewQuestion, Question, QuestionChanges};
use crate::models::quiz::{NewQuiz, Quiz, QuizChanges, QuizFilter};
use crate::models::user::{LeaderboardEntry, NewUser, User};

const QUIZ_COLUMNS: &str = "id, title, image_url, available_from, available_to, created_at, last_modified_at, published, is_deleted";
const QUESTION_COLUMNS: &str = "q.id, q.quiz_id, q.text, q.arrangement, q.article_id, q.points";
const USER_COLUMNS: &str = "id, email, username, opt_in_ranking, role, access_token, refresh_token, token_expires_at, created_at";
const ANSWERS_USER_QUESTION_KEY: &str = "answers_user_question_key";

#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_alternatives(&self, questions: &mut [Question]) -> Result<()> {
        if questions.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let alternatives = sqlx::query_as::<_, Alternative>(
            r#"
            SELECT id, question_id, text, is_correct
            FROM alternatives
            WHERE question_id = ANY($1)
            ORDER BY question_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        for question in questions.iter_mut() {
            question.alternatives = alternatives
                .iter()
                .filter(|a| a.question_id == question.id)
                .cloned()
                .collect();
        }
        Ok(())
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        let created = sqlx::query_as::<_, Quiz>(&format!(
            r#"
            INSERT INTO quizzes (id, title, image_url, available_from, available_to, published)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(quiz.title)
        .bind(quiz.image_url)
        .bind(quiz.available_from)
        .bind(quiz.available_to)
        .bind(quiz.published)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1 AND is_deleted = false"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(quiz)
    }

    async fn list_quizzes(&self, filter: QuizFilter) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            r#"
            SELECT {QUIZ_COLUMNS} FROM quizzes
            WHERE is_deleted = false
              AND ($1::boolean IS NULL OR published = $1)
            ORDER BY available_from DESC, id
            "#
        ))
        .bind(filter.published)
        .fetch_all(&self.pool)
        .await?;
        Ok(quizzes)
    }

    async fn update_quiz(&self, id: Uuid, changes: QuizChanges) -> Result<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            r#"
            UPDATE quizzes
            SET
                title = COALESCE($2, title),
                image_url = CASE WHEN $4 THEN NULL ELSE COALESCE($3, image_url) END,
                available_from = COALESCE($5, available_from),
                available_to = COALESCE($6, available_to),
                published = COALESCE($7, published),
                last_modified_at = NOW()
            WHERE id = $1 AND is_deleted = false
            RETURNING {QUIZ_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.image_url)
        .bind(changes.remove_image)
        .bind(changes.available_from)
        .bind(changes.available_to)
        .bind(changes.published)
        .fetch_optional(&self.pool)
        .await;

        match quiz {
            Ok(quiz) => Ok(quiz),
            Err(sqlx::Error::Database(db)) if db.is_check_violation() => Err(Error::BadRequest(
                "Availability window must start before it ends".to_string(),
            )),
            Err(other) => Err(other.into()),
        }
    }

    async fn soft_delete_quiz(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE quizzes SET is_deleted = true, last_modified_at = NOW() WHERE id = $1 AND is_deleted = false"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn open_quizzes(&self, at: DateTime<Utc>) -> Result<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(&format!(
            r#"
            SELECT {QUIZ_COLUMNS} FROM quizzes
            WHERE published = true
              AND is_deleted = false
              AND available_from <= $1
              AND available_to > $1
            ORDER BY available_from DESC, id
            "#
        ))
        .bind(at)
        .fetch_all(&self.pool)
        .await?;
        Ok(quizzes)
    }

    async fn insert_question(&self, quiz_id: Uuid, question: NewQuestion) -> Result<Question> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent inserts for the same quiz.
        let locked: Option<Uuid> = sqlx::query_scalar(
            r#"SELECT id FROM quizzes WHERE id = $1 AND is_deleted = false FOR UPDATE"#,
        )
        .bind(quiz_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(Error::NoSuchQuiz);
        }

        let mut created = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (id, quiz_id, text, arrangement, article_id, points)
            SELECT $1, $2, $3, COALESCE(MAX(arrangement), 0) + 1, $4, $5
            FROM questions
            WHERE quiz_id = $2
            RETURNING id, quiz_id, text, arrangement, article_id, points
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz_id)
        .bind(question.text)
        .bind(question.article_id)
        .bind(question.points)
        .fetch_one(&mut *tx)
        .await?;

        for (position, alternative) in question.alternatives.into_iter().enumerate() {
            let inserted = sqlx::query_as::<_, Alternative>(
                r#"
                INSERT INTO alternatives (id, question_id, text, is_correct, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, question_id, text, is_correct
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(created.id)
            .bind(alternative.text)
            .bind(alternative.is_correct)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            created.alternatives.push(inserted);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn update_question(&self, id: Uuid, changes: QuestionChanges) -> Result<Option<Question>> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE questions
            SET
                text = COALESCE($2, text),
                points = COALESCE($3, points),
                article_id = CASE WHEN $5 THEN NULL ELSE COALESCE($4, article_id) END
            WHERE id = $1
              AND quiz_id IN (SELECT id FROM quizzes WHERE is_deleted = false)
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.text)
        .bind(changes.points)
        .bind(changes.article_id)
        .bind(changes.remove_article)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_question(id).await,
            None => Ok(None),
        }
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(&format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions q
            JOIN quizzes z ON z.id = q.quiz_id
            WHERE q.id = $1 AND z.is_deleted = false
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(question) = question else {
            return Ok(None);
        };
        let mut questions = vec![question];
        self.attach_alternatives(&mut questions).await?;
        Ok(questions.pop())
    }

    async fn questions_by_quiz(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let mut questions = sqlx::query_as::<_, Question>(&format!(
            r#"
            SELECT {QUESTION_COLUMNS}
            FROM questions q
            JOIN quizzes z ON z.id = q.quiz_id
            WHERE q.quiz_id = $1 AND z.is_deleted = false
            ORDER BY q.arrangement
            "#
        ))
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_alternatives(&mut questions).await?;
        Ok(questions)
    }

    async fn get_alternative(&self, id: Uuid) -> Result<Option<Alternative>> {
        let alternative = sqlx::query_as::<_, Alternative>(
            r#"SELECT id, question_id, text, is_correct FROM alternatives WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(alternative)
    }

    async fn insert_answer(&self, user_id: Uuid, question_id: Uuid, alternative_id: Uuid) -> Result<Answer> {
        let inserted = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (id, user_id, question_id, alternative_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, question_id, alternative_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(question_id)
        .bind(alternative_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(answer) => Ok(answer),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                if db.constraint() == Some(ANSWERS_USER_QUESTION_KEY) {
                    Err(Error::QuestionAlreadyAnswered)
                } else {
                    Err(Error::Database(sqlx::Error::Database(db)))
                }
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(Error::BadRequest(
                "Unknown user or alternative for this question".to_string(),
            )),
            Err(other) => Err(other.into()),
        }
    }

    async fn answered_question_ids(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT q.id
            FROM answers a
            JOIN alternatives alt ON alt.id = a.alternative_id
            JOIN questions q ON q.id = alt.question_id
            WHERE a.user_id = $1 AND q.quiz_id = $2
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn answers_by_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT a.id, a.user_id, a.question_id, a.alternative_id, a.created_at
            FROM answers a
            JOIN questions q ON q.id = a.question_id
            WHERE a.user_id = $1 AND q.quiz_id = $2
            ORDER BY q.arrangement
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn create_article(&self, article: NewArticle) -> Result<Article> {
        let created = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (id, url, title, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, url, title, image_url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(article.url)
        .bind(article.title)
        .bind(article.image_url)
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(article) => Ok(article),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::Conflict("Article already exists".to_string()))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"SELECT id, url, title, image_url, created_at FROM articles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    async fn find_article_by_url(&self, url: String) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"SELECT id, url, title, image_url, created_at FROM articles WHERE url = $1"#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(article)
    }

    async fn articles_by_quiz(&self, quiz_id: Uuid) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT a.id, a.url, a.title, a.image_url, a.created_at
            FROM articles a
            JOIN quiz_articles qa ON qa.article_id = a.id
            WHERE qa.quiz_id = $1
            ORDER BY qa.added_at, a.id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }

    async fn add_article_to_quiz(&self, article_id: Uuid, quiz_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO quiz_articles (quiz_id, article_id)
            VALUES ($1, $2)
            ON CONFLICT (quiz_id, article_id) DO NOTHING
            "#,
        )
        .bind(quiz_id)
        .bind(article_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_article_from_quiz(&self, article_id: Uuid, quiz_id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM quiz_articles WHERE quiz_id = $1 AND article_id = $2"#)
            .bind(quiz_id)
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, username, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(user.email)
        .bind(user.username)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match created {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::Conflict("User already exists".to_string()))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_ranking_opt_in(&self, user_id: Uuid, opt_in: bool) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET opt_in_ranking = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(opt_in)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn set_username(&self, user_id: Uuid, username: String) -> Result<Option<User>> {
        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET username = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(Error::Conflict("Username already taken".to_string()))
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT
                u.id AS user_id,
                u.username,
                COALESCE(SUM(CASE WHEN alt.is_correct THEN q.points ELSE 0 END), 0)::BIGINT AS total_points
            FROM users u
            JOIN answers a ON a.user_id = u.id
            JOIN alternatives alt ON alt.id = a.alternative_id
            JOIN questions q ON q.id = a.question_id
            JOIN quizzes z ON z.id = q.quiz_id AND z.is_deleted = false
            WHERE u.opt_in_ranking = true
            GROUP BY u.id, u.username
            ORDER BY total_points DESC, u.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
