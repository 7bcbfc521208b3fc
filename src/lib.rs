pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::database::{PgQuizStore, QuizStore};
use crate::services::{
    catalog_service::CatalogService, leaderboard_service::LeaderboardService,
    open_quiz_service::OpenQuizService, progression_service::ProgressionService,
    scoring_service::ScoringService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub catalog_service: CatalogService,
    pub progression_service: ProgressionService,
    pub scoring_service: ScoringService,
    pub open_quiz_service: OpenQuizService,
    pub leaderboard_service: LeaderboardService,
    pub user_service: UserService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self::with_store(Arc::new(PgQuizStore::new(pool)))
    }

    pub fn with_store(store: Arc<dyn QuizStore>) -> Self {
        Self {
            catalog_service: CatalogService::new(store.clone()),
            progression_service: ProgressionService::new(store.clone()),
            scoring_service: ScoringService::new(store.clone()),
            open_quiz_service: OpenQuizService::new(store.clone()),
            leaderboard_service: LeaderboardService::new(store.clone()),
            user_service: UserService::new(store.clone()),
            store,
        }
    }
}
