pub mod catalog_service;
pub mod grading_service;
pub mod leaderboard_service;
pub mod open_quiz_service;
pub mod progression_service;
pub mod scoring_service;
pub mod user_service;
