//! Engine error types.
//!
//! Two families: `ValidationIssue` values that authors are expected to fix and
//! that are always returned as a complete list, and `EngineError`, raised when
//! the engine is handed input it refuses to guess about or when a submission
//! is not allowed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{LessonId, QuizId};

/// Errors raised by grading, progression and the submission service.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller handed in something structurally impossible
    /// (zero-question quiz, answer for an unknown alternative, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The lesson is not part of the course structure.
    #[error("unknown lesson: {0}")]
    UnknownLesson(LessonId),

    /// No quiz with this id is known to the store.
    #[error("unknown quiz: {0}")]
    UnknownQuiz(QuizId),

    /// The lesson has no assessment attached.
    #[error("lesson {0} has no quiz")]
    NoQuizForLesson(LessonId),

    /// The learner has not unlocked the lesson yet.
    #[error("lesson {0} is locked for this learner")]
    LessonLocked(LessonId),

    /// The quiz has not been published for learners.
    #[error("quiz {0} is not published")]
    QuizNotPublished(QuizId),

    /// The per-learner attempt limit is used up.
    #[error("attempt limit reached for quiz {quiz}: {used} of {max} used")]
    AttemptsExhausted { quiz: String, used: u32, max: u32 },

    /// A quiz draft failed validation; every issue is listed.
    #[error("quiz draft rejected with {} issue(s)", .0.len())]
    Rejected(Vec<ValidationIssue>),

    /// The persistence boundary failed.
    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Returns `true` if this error points at a bug in the caller's
    /// integration rather than at a learner or author action.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidInput(_) | EngineError::UnknownLesson(_)
        )
    }
}

/// Why a quiz draft was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationReason {
    #[error("quiz title is required")]
    EmptyTitle,

    #[error("a quiz must have at least one question before it is finalized")]
    NoQuestions,

    #[error("pass threshold must be between 0 and 100")]
    PassThresholdOutOfRange,

    #[error("question statement is required")]
    EmptyStatement,

    #[error("question needs at least one alternative with text")]
    NoAlternativeText,

    #[error("question must have exactly one correct alternative, none is marked")]
    NoCorrectAlternative,

    #[error("question must have exactly one correct alternative, {count} are marked")]
    MultipleCorrectAlternatives { count: usize },

    #[error("question weight must be a positive number")]
    InvalidWeight,

    #[error("question id {id} is used more than once")]
    DuplicateQuestionId { id: u64 },

    #[error("alternative id {id} is used more than once in this question")]
    DuplicateAlternativeId { id: u64 },
}

/// One defect found in a quiz draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Position of the offending question in the draft as submitted;
    /// `None` for quiz-level problems.
    pub question_index: Option<usize>,
    pub reason: ValidationReason,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.question_index {
            Some(idx) => write!(f, "question {}: {}", idx + 1, self.reason),
            None => write!(f, "{}", self.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_is_one_based() {
        let issue = ValidationIssue {
            question_index: Some(0),
            reason: ValidationReason::NoCorrectAlternative,
        };
        assert!(issue.to_string().starts_with("question 1:"));

        let quiz_level = ValidationIssue {
            question_index: None,
            reason: ValidationReason::EmptyTitle,
        };
        assert_eq!(quiz_level.to_string(), "quiz title is required");
    }

    #[test]
    fn caller_bug_classification() {
        assert!(EngineError::InvalidInput("x".into()).is_caller_bug());
        assert!(!EngineError::LessonLocked(LessonId(1)).is_caller_bug());
        assert!(!EngineError::AttemptsExhausted {
            quiz: "1".into(),
            used: 3,
            max: 3
        }
        .is_caller_bug());
    }

    #[test]
    fn reason_serializes_with_code() {
        let json = serde_json::to_string(&ValidationReason::MultipleCorrectAlternatives { count: 2 })
            .unwrap();
        assert!(json.contains("\"code\":\"multiple_correct_alternatives\""));
        assert!(json.contains("\"count\":2"));
    }
}
