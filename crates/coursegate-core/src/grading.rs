//! Submission grading.
//!
//! Scores a learner's answers against a quiz. Unanswered questions count as
//! incorrect; answers that reference questions or alternatives the quiz does
//! not contain are integration bugs and fail loudly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::ids::{AlternativeId, QuestionId};
use crate::model::Quiz;

/// A learner's answers: chosen alternative per question.
pub type Answers = HashMap<QuestionId, AlternativeId>;

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Correct answers, summed by weight.
    pub correct_count: f64,
    /// All questions, summed by weight.
    pub total_count: f64,
    /// `correct_count / total_count * 100`, rounded half-up.
    pub percentage: u32,
    pub passed: bool,
}

/// Grade `answers` against `quiz`.
pub fn grade_submission(quiz: &Quiz, answers: &Answers) -> Result<GradeResult, EngineError> {
    if quiz.questions.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "quiz '{}' has no questions",
            quiz.title
        )));
    }

    for (question_id, alternative_id) in answers {
        let question = quiz.question(*question_id).ok_or_else(|| {
            EngineError::InvalidInput(format!(
                "answer references question {question_id} which is not in quiz '{}'",
                quiz.title
            ))
        })?;
        if question.alternative(*alternative_id).is_none() {
            return Err(EngineError::InvalidInput(format!(
                "answer references alternative {alternative_id} which does not belong to question {question_id}"
            )));
        }
    }

    let mut correct = 0.0;
    let mut total = 0.0;
    for (index, question) in quiz.questions.iter().enumerate() {
        let Some(question_id) = question.id else {
            return Err(EngineError::InvalidInput(format!(
                "question {} of quiz '{}' has no id",
                index + 1,
                quiz.title
            )));
        };
        if !question.weight.is_finite() || question.weight <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "question {question_id} has weight {}",
                question.weight
            )));
        }

        total += question.weight;

        let answered_correctly = answers
            .get(&question_id)
            .and_then(|alt| question.alternative(*alt))
            .is_some_and(|alt| alt.is_correct);
        if answered_correctly {
            correct += question.weight;
        }
    }

    let percentage = round_half_up_percent(correct, total);
    let passed = f64::from(percentage) >= quiz.pass_threshold;

    tracing::debug!(
        quiz = %quiz.title,
        correct,
        total,
        percentage,
        passed,
        "graded submission"
    );

    Ok(GradeResult {
        correct_count: correct,
        total_count: total,
        percentage,
        passed,
    })
}

/// `part / whole * 100` rounded half-up to a whole percent.
pub(crate) fn round_half_up_percent(part: f64, whole: f64) -> u32 {
    if whole <= 0.0 {
        return 0;
    }
    // Multiply before dividing so exact halves like 12.5 stay exact.
    let raw = part * 100.0 / whole;
    // Absorb representation error just below a .5 boundary.
    (raw + 0.5 + 1e-9).floor().clamp(0.0, 100.0) as u32
}

/// Refuse a new submission once the learner has used up the quiz's attempts.
pub fn check_attempt_allowed(quiz: &Quiz, attempts_used: u32) -> Result<(), EngineError> {
    match quiz.max_attempts {
        Some(max) if max > 0 && attempts_used >= max => Err(EngineError::AttemptsExhausted {
            quiz: quiz
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| quiz.title.clone()),
            used: attempts_used,
            max,
        }),
        _ => Ok(()),
    }
}
