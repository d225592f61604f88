//! Core data model types for coursegate.
//!
//! Two families live here: the quiz model that authors edit and learners are
//! graded against, and the read model of course structure plus attempt
//! history that progression is computed from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AlternativeId, CourseId, LearnerId, LessonId, ModuleId, QuestionId, QuizId};

/// Pass threshold used when a quiz does not declare one.
pub const DEFAULT_PASS_THRESHOLD: f64 = 100.0;

// ---------------------------------------------------------------------------
// Quiz model
// ---------------------------------------------------------------------------

/// One selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// Assigned by persistence; drafts may omit it.
    #[serde(default)]
    pub id: Option<AlternativeId>,
    /// Text shown to the learner.
    pub text: String,
    /// Whether choosing this alternative answers the question correctly.
    #[serde(default)]
    pub is_correct: bool,
    /// Declared position among its siblings.
    #[serde(default)]
    pub order: Option<i64>,
}

/// A single question with its ordered alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: Option<QuestionId>,
    /// The question text.
    pub statement: String,
    /// Score weight; only matters when some question deviates from 1.
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
}

impl Question {
    /// Alternatives currently flagged as correct.
    pub fn correct_alternatives(&self) -> impl Iterator<Item = &Alternative> {
        self.alternatives.iter().filter(|a| a.is_correct)
    }

    /// Look up an alternative of this question by id.
    pub fn alternative(&self, id: AlternativeId) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.id == Some(id))
    }
}

fn default_weight() -> f64 {
    1.0
}

/// What a quiz is attached to. Never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum QuizScope {
    /// Course-level exam.
    Course(CourseId),
    /// Lesson-level exam gating progression.
    Lesson(LessonId),
}

/// An assessment: ordered questions plus the threshold needed to pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub id: Option<QuizId>,
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Percentage (0-100) a learner must reach to pass.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
    /// Maximum number of graded submissions per learner; `None` = unlimited.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Whether learners can currently take the quiz.
    #[serde(default)]
    pub published: bool,
    pub scope: QuizScope,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Look up a question by id.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == Some(id))
    }

    /// True if any question carries a weight other than 1.
    pub fn is_weighted(&self) -> bool {
        self.questions.iter().any(|q| q.weight != 1.0)
    }
}

fn default_pass_threshold() -> f64 {
    DEFAULT_PASS_THRESHOLD
}

// ---------------------------------------------------------------------------
// Course structure (read model)
// ---------------------------------------------------------------------------

/// A lesson, the unit progression gates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub module_id: ModuleId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: Option<i64>,
    /// The lesson-level quiz, if one is attached.
    #[serde(default)]
    pub quiz_id: Option<QuizId>,
}

impl Lesson {
    pub fn has_quiz(&self) -> bool {
        self.quiz_id.is_some()
    }
}

/// A module: an ordered group of lessons within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// A course with its full module and lesson tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Course {
    /// Find a lesson anywhere in the course.
    pub fn lesson(&self, id: LessonId) -> Option<&Lesson> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .find(|l| l.id == id)
    }

    /// Total number of lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Attempts
// ---------------------------------------------------------------------------

/// One graded submission. Append-only: the engine never edits or deletes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub lesson_id: LessonId,
    pub learner_id: LearnerId,
    pub percentage: u32,
    pub passed: bool,
    pub timestamp: DateTime<Utc>,
}
