use uuid::Uuid;

use crate::dto::play_dto::FeedbackSummary;
use crate::models::question::{Alternative, Question};

pub struct GradingService;

impl GradingService {
    /// All-or-nothing: the full point value for the correct alternative,
    /// zero for anything else.
    pub fn grade(question: &Question, chosen_alternative_id: Uuid) -> (bool, i32) {
        let is_correct = question
            .correct_alternative()
            .is_some_and(|a| a.id == chosen_alternative_id);
        let points_awarded = if is_correct { question.points } else { 0 };
        (is_correct, points_awarded)
    }

    pub fn feedback(question: &Question, chosen: &Alternative) -> FeedbackSummary {
        let (is_correct, points_awarded) = Self::grade(question, chosen.id);
        FeedbackSummary {
            question_id: question.id,
            question_text: question.text.clone(),
            max_points: question.points,
            chosen_alternative_id: chosen.id,
            chosen_alternative_text: chosen.text.clone(),
            correct_alternative_id: question.correct_alternative().map(|a| a.id),
            is_correct,
            points_awarded,
        }
    }
}
