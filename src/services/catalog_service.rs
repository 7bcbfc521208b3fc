use chrono::{DateTime, Utc};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::database::QuizStore;
use crate::error::{Error, Result};
use crate::models::article::{Article, NewArticle};
use crate::models::question::{NewQuestion, Question, QuestionChanges};
use crate::models::quiz::{NewQuiz, Quiz, QuizChanges, QuizFilter};

/// Authoring side of the quiz catalogue: quizzes, their questions and the
/// news articles attached to them.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn QuizStore>,
}

fn check_window(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<()> {
    if from >= to {
        return Err(Error::BadRequest(
            "available_from must be before available_to".to_string(),
        ));
    }
    Ok(())
}

fn check_question(question: &NewQuestion) -> Result<()> {
    if question.text.trim().is_empty() {
        return Err(Error::BadRequest("Question text must not be empty".to_string()));
    }
    if question.points < 0 {
        return Err(Error::BadRequest("Points must not be negative".to_string()));
    }
    if question.alternatives.len() < 2 {
        return Err(Error::BadRequest(
            "A question needs at least two alternatives".to_string(),
        ));
    }
    if question.alternatives.iter().any(|a| a.text.trim().is_empty()) {
        return Err(Error::BadRequest("Alternative text must not be empty".to_string()));
    }
    let correct = question.alternatives.iter().filter(|a| a.is_correct).count();
    if correct != 1 {
        return Err(Error::BadRequest(format!(
            "Exactly one alternative must be correct, got {correct}"
        )));
    }
    Ok(())
}

/// Canonical form used to recognise the same article across quizzes: http(s)
/// only, fragment dropped.
fn normalize_article_url(raw: &str) -> Result<String> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| Error::BadRequest(format!("Invalid article URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::BadRequest(
            "Only HTTP and HTTPS article links are allowed".to_string(),
        ));
    }
    url.set_fragment(None);
    Ok(url.to_string())
}

impl CatalogService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    async fn require_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        self.store.get_quiz(quiz_id).await?.ok_or(Error::NoSuchQuiz)
    }

    async fn require_article(&self, article_id: Uuid) -> Result<Article> {
        self.store
            .get_article(article_id)
            .await?
            .ok_or_else(|| Error::NotFound("Article not found".to_string()))
    }

    pub async fn create_default_quiz(&self) -> Result<Quiz> {
        self.create_quiz(NewQuiz::default_at(Utc::now())).await
    }

    pub async fn create_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        if quiz.title.trim().is_empty() {
            return Err(Error::BadRequest("Quiz title must not be empty".to_string()));
        }
        check_window(quiz.available_from, quiz.available_to)?;
        let created = self.store.create_quiz(quiz).await?;
        tracing::info!(quiz_id = %created.id, title = %created.title, "quiz created");
        Ok(created)
    }

    /// Quiz with its questions, alternatives included.
    pub async fn get_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let mut quiz = self.require_quiz(quiz_id).await?;
        quiz.questions = self.store.questions_by_quiz(quiz_id).await?;
        Ok(quiz)
    }

    pub async fn list_quizzes(&self, filter: QuizFilter) -> Result<Vec<Quiz>> {
        self.store.list_quizzes(filter).await
    }

    pub async fn update_quiz(&self, quiz_id: Uuid, changes: QuizChanges) -> Result<Quiz> {
        let mut preview = self.require_quiz(quiz_id).await?;
        changes.apply(&mut preview);
        if preview.title.trim().is_empty() {
            return Err(Error::BadRequest("Quiz title must not be empty".to_string()));
        }
        check_window(preview.available_from, preview.available_to)?;

        let updated = self
            .store
            .update_quiz(quiz_id, changes)
            .await?
            .ok_or(Error::NoSuchQuiz)?;
        tracing::info!(%quiz_id, published = updated.published, "quiz updated");
        Ok(updated)
    }

    pub async fn delete_quiz(&self, quiz_id: Uuid) -> Result<()> {
        if !self.store.soft_delete_quiz(quiz_id).await? {
            return Err(Error::NoSuchQuiz);
        }
        tracing::info!(%quiz_id, "quiz deleted");
        Ok(())
    }

    /// Appends a question to the end of the quiz.
    pub async fn add_question(&self, quiz_id: Uuid, question: NewQuestion) -> Result<Question> {
        check_question(&question)?;
        self.require_quiz(quiz_id).await?;
        if let Some(article_id) = question.article_id {
            self.require_article(article_id).await?;
        }
        let created = self.store.insert_question(quiz_id, question).await?;
        tracing::info!(
            %quiz_id,
            question_id = %created.id,
            arrangement = created.arrangement,
            "question added"
        );
        Ok(created)
    }

    pub async fn update_question(
        &self,
        question_id: Uuid,
        changes: QuestionChanges,
    ) -> Result<Question> {
        if changes.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::BadRequest("Question text must not be empty".to_string()));
        }
        if changes.points.is_some_and(|p| p < 0) {
            return Err(Error::BadRequest("Points must not be negative".to_string()));
        }
        if let (Some(article_id), false) = (changes.article_id, changes.remove_article) {
            self.require_article(article_id).await?;
        }
        self.store
            .update_question(question_id, changes)
            .await?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))
    }

    /// Links an article to the quiz, reusing an existing article with the same
    /// URL.
    pub async fn add_article(&self, quiz_id: Uuid, mut article: NewArticle) -> Result<Article> {
        article.url = normalize_article_url(&article.url)?;
        self.require_quiz(quiz_id).await?;
        let url = article.url.clone();
        let article = match self.store.find_article_by_url(url.clone()).await? {
            Some(existing) => existing,
            None => match self.store.create_article(article).await {
                Ok(created) => created,
                Err(Error::Conflict(msg)) => self
                    .store
                    .find_article_by_url(url)
                    .await?
                    .ok_or(Error::Conflict(msg))?,
                Err(e) => return Err(e),
            },
        };
        if !self.store.add_article_to_quiz(article.id, quiz_id).await? {
            return Err(Error::Conflict("Article is already in quiz".to_string()));
        }
        tracing::info!(%quiz_id, article_id = %article.id, "article linked to quiz");
        Ok(article)
    }

    pub async fn articles(&self, quiz_id: Uuid) -> Result<Vec<Article>> {
        self.require_quiz(quiz_id).await?;
        self.store.articles_by_quiz(quiz_id).await
    }

    pub async fn remove_article(&self, quiz_id: Uuid, article_id: Uuid) -> Result<()> {
        if !self.store.remove_article_from_quiz(article_id, quiz_id).await? {
            return Err(Error::NotFound("Article is not linked to quiz".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryStore;
    use crate::models::question::NewAlternative;
    use chrono::Duration;

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(InMemoryStore::new()))
    }

    fn question(correct: &[bool]) -> NewQuestion {
        NewQuestion {
            text: "Which city hosted the summit?".into(),
            article_id: None,
            points: 10,
            alternatives: correct
                .iter()
                .enumerate()
                .map(|(i, &is_correct)| NewAlternative {
                    text: format!("City {i}"),
                    is_correct,
                })
                .collect(),
        }
    }

    fn article(url: &str) -> NewArticle {
        NewArticle {
            url: url.to_string(),
            title: "Summit ends".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn default_quiz_is_a_week_long_draft() {
        let quiz = service().create_default_quiz().await.unwrap();
        assert!(quiz.title.starts_with("Quiz: Week "));
        assert!(!quiz.published);
        assert_eq!(quiz.available_to - quiz.available_from, Duration::days(7));
    }

    #[tokio::test]
    async fn inverted_window_is_rejected_on_create_and_update() {
        let svc = service();
        let now = Utc::now();
        let bad = NewQuiz {
            title: "Bad".into(),
            image_url: None,
            available_from: now,
            available_to: now,
            published: false,
        };
        assert!(matches!(svc.create_quiz(bad).await, Err(Error::BadRequest(_))));

        let quiz = svc.create_default_quiz().await.unwrap();
        let changes = QuizChanges {
            available_to: Some(quiz.available_from - Duration::hours(1)),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_quiz(quiz.id, changes).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn questions_are_appended_in_order() {
        let svc = service();
        let quiz = svc.create_default_quiz().await.unwrap();
        for _ in 0..3 {
            svc.add_question(quiz.id, question(&[true, false])).await.unwrap();
        }

        let full = svc.get_quiz(quiz.id).await.unwrap();
        let arrangements: Vec<i32> = full.questions.iter().map(|q| q.arrangement).collect();
        assert_eq!(arrangements, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn question_needs_exactly_one_correct_alternative() {
        let svc = service();
        let quiz = svc.create_default_quiz().await.unwrap();
        for correct in [&[false, false][..], &[true, true][..], &[true][..]] {
            assert!(matches!(
                svc.add_question(quiz.id, question(correct)).await,
                Err(Error::BadRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn question_for_missing_quiz_or_article_is_rejected() {
        let svc = service();
        assert!(matches!(
            svc.add_question(Uuid::new_v4(), question(&[true, false])).await,
            Err(Error::NoSuchQuiz)
        ));

        let quiz = svc.create_default_quiz().await.unwrap();
        let mut q = question(&[true, false]);
        q.article_id = Some(Uuid::new_v4());
        assert!(matches!(
            svc.add_question(quiz.id, q).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleted_quiz_disappears() {
        let svc = service();
        let quiz = svc.create_default_quiz().await.unwrap();
        svc.delete_quiz(quiz.id).await.unwrap();

        assert!(matches!(svc.get_quiz(quiz.id).await, Err(Error::NoSuchQuiz)));
        assert!(matches!(svc.delete_quiz(quiz.id).await, Err(Error::NoSuchQuiz)));
        assert!(svc.list_quizzes(QuizFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn articles_are_shared_by_url_and_linked_once() {
        let svc = service();
        let first = svc.create_default_quiz().await.unwrap();
        let second = svc.create_default_quiz().await.unwrap();

        let a = svc.add_article(first.id, article("https://news.example/summit")).await.unwrap();
        let b = svc
            .add_article(second.id, article("https://news.example/summit#comments"))
            .await
            .unwrap();
        assert_eq!(a.id, b.id);

        assert!(matches!(
            svc.add_article(first.id, article("https://news.example/summit")).await,
            Err(Error::Conflict(_))
        ));

        svc.remove_article(first.id, a.id).await.unwrap();
        assert!(svc.articles(first.id).await.unwrap().is_empty());
        assert_eq!(svc.articles(second.id).await.unwrap().len(), 1);
        assert!(matches!(
            svc.remove_article(first.id, a.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn non_web_article_links_are_rejected() {
        let svc = service();
        let quiz = svc.create_default_quiz().await.unwrap();
        assert!(matches!(
            svc.add_article(quiz.id, article("ftp://news.example/file")).await,
            Err(Error::BadRequest(_))
        ));
    }
}
