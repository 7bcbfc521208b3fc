use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::database::store::QuizStore;
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::article::{Article, NewArticle};
use crate::models::question::{Alternative, NewQuestion, Question, QuestionChanges};
use crate::models::quiz::{NewQuiz, Quiz, QuizChanges, QuizFilter};
use crate::models::user::{LeaderboardEntry, NewUser, User};

#[derive(Default)]
struct Inner {
    quizzes: HashMap<Uuid, Quiz>,
    questions: HashMap<Uuid, Question>,
    alternatives: HashMap<Uuid, Alternative>,
    answers: Vec<Answer>,
    articles: HashMap<Uuid, Article>,
    quiz_articles: Vec<(Uuid, Uuid)>,
    users: HashMap<Uuid, User>,
}

impl Inner {
    fn live_quiz(&self, id: Uuid) -> Option<&Quiz> {
        self.quizzes.get(&id).filter(|q| !q.is_deleted)
    }

    fn live_question(&self, id: Uuid) -> Option<&Question> {
        self.questions
            .get(&id)
            .filter(|q| self.live_quiz(q.quiz_id).is_some())
    }

    fn quiz_of_answer(&self, answer: &Answer) -> Option<Uuid> {
        let alternative = self.alternatives.get(&answer.alternative_id)?;
        self.questions.get(&alternative.question_id).map(|q| q.quiz_id)
    }
}

/// Mutex-guarded store with the same uniqueness and ordering rules as the
/// Postgres schema. Every operation holds the lock for its whole duration.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Internal("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl QuizStore for InMemoryStore {
    async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        let now = Utc::now();
        let created = Quiz {
            id: Uuid::new_v4(),
            title: quiz.title,
            image_url: quiz.image_url,
            available_from: quiz.available_from,
            available_to: quiz.available_to,
            created_at: now,
            last_modified_at: now,
            published: quiz.published,
            is_deleted: false,
            questions: Vec::new(),
        };
        self.lock()?.quizzes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
        Ok(self.lock()?.live_quiz(id).cloned())
    }

    async fn list_quizzes(&self, filter: QuizFilter) -> Result<Vec<Quiz>> {
        let inner = self.lock()?;
        let mut quizzes: Vec<Quiz> = inner
            .quizzes
            .values()
            .filter(|q| !q.is_deleted)
            .filter(|q| filter.published.map_or(true, |p| q.published == p))
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| {
            b.available_from
                .cmp(&a.available_from)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(quizzes)
    }

    async fn update_quiz(&self, id: Uuid, changes: QuizChanges) -> Result<Option<Quiz>> {
        let mut inner = self.lock()?;
        let Some(quiz) = inner.quizzes.get_mut(&id).filter(|q| !q.is_deleted) else {
            return Ok(None);
        };
        changes.apply(quiz);
        quiz.last_modified_at = Utc::now();
        Ok(Some(quiz.clone()))
    }

    async fn soft_delete_quiz(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.quizzes.get_mut(&id).filter(|q| !q.is_deleted) {
            Some(quiz) => {
                quiz.is_deleted = true;
                quiz.last_modified_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn open_quizzes(&self, at: DateTime<Utc>) -> Result<Vec<Quiz>> {
        let inner = self.lock()?;
        let mut quizzes: Vec<Quiz> = inner
            .quizzes
            .values()
            .filter(|q| q.is_open_at(at))
            .cloned()
            .collect();
        quizzes.sort_by(|a, b| {
            b.available_from
                .cmp(&a.available_from)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(quizzes)
    }

    async fn insert_question(&self, quiz_id: Uuid, question: NewQuestion) -> Result<Question> {
        let mut inner = self.lock()?;
        if inner.live_quiz(quiz_id).is_none() {
            return Err(Error::NoSuchQuiz);
        }
        let arrangement = inner
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.arrangement)
            .max()
            .unwrap_or(0)
            + 1;

        let id = Uuid::new_v4();
        let alternatives: Vec<Alternative> = question
            .alternatives
            .into_iter()
            .map(|a| Alternative {
                id: Uuid::new_v4(),
                question_id: id,
                text: a.text,
                is_correct: a.is_correct,
            })
            .collect();
        for alternative in &alternatives {
            inner.alternatives.insert(alternative.id, alternative.clone());
        }

        let created = Question {
            id,
            quiz_id,
            text: question.text,
            arrangement,
            article_id: question.article_id,
            points: question.points,
            alternatives,
        };
        inner.questions.insert(id, created.clone());
        Ok(created)
    }

    async fn update_question(&self, id: Uuid, changes: QuestionChanges) -> Result<Option<Question>> {
        let mut inner = self.lock()?;
        if inner.live_question(id).is_none() {
            return Ok(None);
        }
        let Some(question) = inner.questions.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(question);
        Ok(Some(question.clone()))
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
        Ok(self.lock()?.live_question(id).cloned())
    }

    async fn questions_by_quiz(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let inner = self.lock()?;
        if inner.live_quiz(quiz_id).is_none() {
            return Ok(Vec::new());
        }
        let mut questions: Vec<Question> = inner
            .questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.arrangement);
        Ok(questions)
    }

    async fn get_alternative(&self, id: Uuid) -> Result<Option<Alternative>> {
        Ok(self.lock()?.alternatives.get(&id).cloned())
    }

    async fn insert_answer(&self, user_id: Uuid, question_id: Uuid, alternative_id: Uuid) -> Result<Answer> {
        let mut inner = self.lock()?;
        let alternative_matches = inner
            .alternatives
            .get(&alternative_id)
            .is_some_and(|a| a.question_id == question_id);
        if !inner.users.contains_key(&user_id) || !alternative_matches {
            return Err(Error::BadRequest(
                "Unknown user or alternative for this question".to_string(),
            ));
        }
        if inner
            .answers
            .iter()
            .any(|a| a.user_id == user_id && a.question_id == question_id)
        {
            return Err(Error::QuestionAlreadyAnswered);
        }

        let answer = Answer {
            id: Uuid::new_v4(),
            user_id,
            question_id,
            alternative_id,
            created_at: Utc::now(),
        };
        inner.answers.push(answer.clone());
        Ok(answer)
    }

    async fn answered_question_ids(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<Uuid>> {
        let inner = self.lock()?;
        Ok(inner
            .answers
            .iter()
            .filter(|a| a.user_id == user_id && inner.quiz_of_answer(a) == Some(quiz_id))
            .map(|a| a.question_id)
            .collect())
    }

    async fn answers_by_quiz(&self, user_id: Uuid, quiz_id: Uuid) -> Result<Vec<Answer>> {
        let inner = self.lock()?;
        let mut answers: Vec<Answer> = inner
            .answers
            .iter()
            .filter(|a| a.user_id == user_id && inner.quiz_of_answer(a) == Some(quiz_id))
            .cloned()
            .collect();
        answers.sort_by_key(|a| {
            inner
                .questions
                .get(&a.question_id)
                .map_or(i32::MAX, |q| q.arrangement)
        });
        Ok(answers)
    }

    async fn create_article(&self, article: NewArticle) -> Result<Article> {
        let mut inner = self.lock()?;
        if inner.articles.values().any(|a| a.url == article.url) {
            return Err(Error::Conflict("Article already exists".to_string()));
        }
        let created = Article {
            id: Uuid::new_v4(),
            url: article.url,
            title: article.title,
            image_url: article.image_url,
            created_at: Utc::now(),
        };
        inner.articles.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.lock()?.articles.get(&id).cloned())
    }

    async fn find_article_by_url(&self, url: String) -> Result<Option<Article>> {
        Ok(self
            .lock()?
            .articles
            .values()
            .find(|a| a.url == url)
            .cloned())
    }

    async fn articles_by_quiz(&self, quiz_id: Uuid) -> Result<Vec<Article>> {
        let inner = self.lock()?;
        Ok(inner
            .quiz_articles
            .iter()
            .filter(|(quiz, _)| *quiz == quiz_id)
            .filter_map(|(_, article)| inner.articles.get(article).cloned())
            .collect())
    }

    async fn add_article_to_quiz(&self, article_id: Uuid, quiz_id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        if inner.live_quiz(quiz_id).is_none() || !inner.articles.contains_key(&article_id) {
            return Err(Error::NotFound("Quiz or article not found".to_string()));
        }
        if inner.quiz_articles.contains(&(quiz_id, article_id)) {
            return Ok(false);
        }
        inner.quiz_articles.push((quiz_id, article_id));
        Ok(true)
    }

    async fn remove_article_from_quiz(&self, article_id: Uuid, quiz_id: Uuid) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.quiz_articles.len();
        inner
            .quiz_articles
            .retain(|link| *link != (quiz_id, article_id));
        Ok(inner.quiz_articles.len() < before)
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut inner = self.lock()?;
        let username_taken = user.username.is_some()
            && inner.users.values().any(|u| u.username == user.username);
        if inner.users.contains_key(&user.id)
            || inner.users.values().any(|u| u.email == user.email)
            || username_taken
        {
            return Err(Error::Conflict("User already exists".to_string()));
        }
        let created = User {
            id: user.id,
            email: user.email,
            username: user.username,
            opt_in_ranking: true,
            role: user.role.as_str().to_string(),
            access_token: None,
            refresh_token: None,
            token_expires_at: None,
            created_at: Utc::now(),
        };
        inner.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn set_ranking_opt_in(&self, user_id: Uuid, opt_in: bool) -> Result<Option<User>> {
        let mut inner = self.lock()?;
        Ok(inner.users.get_mut(&user_id).map(|user| {
            user.opt_in_ranking = opt_in;
            user.clone()
        }))
    }

    async fn set_username(&self, user_id: Uuid, username: String) -> Result<Option<User>> {
        let mut inner = self.lock()?;
        if inner
            .users
            .values()
            .any(|u| u.id != user_id && u.username.as_deref() == Some(username.as_str()))
        {
            return Err(Error::Conflict("Username already taken".to_string()));
        }
        Ok(inner.users.get_mut(&user_id).map(|user| {
            user.username = Some(username);
            user.clone()
        }))
    }

    async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let inner = self.lock()?;
        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for answer in &inner.answers {
            let Some(user) = inner.users.get(&answer.user_id).filter(|u| u.opt_in_ranking) else {
                continue;
            };
            let Some(question) = inner.live_question(answer.question_id) else {
                continue;
            };
            let correct = inner
                .alternatives
                .get(&answer.alternative_id)
                .is_some_and(|a| a.is_correct);
            let points = if correct { i64::from(question.points) } else { 0 };
            *totals.entry(user.id).or_insert(0) += points;
        }

        let mut entries: Vec<LeaderboardEntry> = totals
            .into_iter()
            .map(|(user_id, total_points)| LeaderboardEntry {
                user_id,
                username: inner.users.get(&user_id).and_then(|u| u.username.clone()),
                total_points,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        entries.truncate(usize::try_from(limit.max(0)).unwrap_or(0));
        Ok(entries)
    }
}
