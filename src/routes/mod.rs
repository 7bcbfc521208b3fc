pub mod admin;
pub mod docs;
pub mod health;
pub mod public;
pub mod quiz;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};

use crate::middleware::{auth, rate_limit};
use crate::AppState;

/// Full application router, without the outer CORS / trace layers.
pub fn build_router(state: AppState, public_rps: u32, api_rps: u32) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let quiz_api = Router::new()
        .route("/api/v1/quiz/next-question", get(quiz::next_question))
        .route("/api/v1/quiz/user-answer", post(quiz::submit_answer))
        .route("/api/v1/quiz/summary", get(quiz::summary))
        .route("/api/v1/quiz/articles", get(quiz::articles))
        .route("/api/v1/quiz/leaderboard", get(quiz::leaderboard))
        .route("/api/v1/quiz/me/ranking", patch(quiz::set_ranking))
        .route("/api/v1/quiz/me/username", patch(quiz::assign_username))
        .route_layer(from_fn_with_state(state.clone(), auth::require_bearer_auth))
        .layer(from_fn_with_state(
            rate_limit::new_rps_state(api_rps),
            rate_limit::rps_middleware,
        ));

    let public_api = Router::new()
        .route("/api/v1/public/open-quiz", get(public::open_quiz))
        .route("/api/v1/public/question", get(public::question))
        .route("/api/v1/public/user-answer", post(public::submit_answer))
        .layer(from_fn_with_state(
            rate_limit::new_rps_state(public_rps),
            rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route(
            "/api/v1/admin/quiz",
            get(admin::list_quizzes).post(admin::create_quiz),
        )
        .route("/api/v1/admin/quiz/create-new", post(admin::create_default_quiz))
        .route(
            "/api/v1/admin/quiz/:id",
            get(admin::get_quiz)
                .patch(admin::update_quiz)
                .delete(admin::delete_quiz),
        )
        .route("/api/v1/admin/quiz/:id/questions", post(admin::add_question))
        .route("/api/v1/admin/questions/:id", patch(admin::update_question))
        .route("/api/v1/admin/quiz/:id/articles", post(admin::add_article))
        .route(
            "/api/v1/admin/quiz/:id/articles/:article_id",
            delete(admin::remove_article),
        )
        .route_layer(from_fn_with_state(state.clone(), auth::require_admin))
        .layer(from_fn_with_state(
            rate_limit::new_rps_state(api_rps),
            rate_limit::rps_middleware,
        ));

    base_routes
        .merge(quiz_api)
        .merge(public_api)
        .merge(admin_api)
        .with_state(state)
}
