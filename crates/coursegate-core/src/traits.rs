//! Boundary traits for the persistence layer the engine consumes.
//!
//! The engine never owns storage. An application implements these against its
//! database or API; `crate::store::InMemoryStore` implements them for tests
//! and batch runs.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::ids::{AttemptId, CourseId, LearnerId, LessonId, QuizId};
use crate::model::{AttemptResult, Course, Quiz};

// ---------------------------------------------------------------------------
// Course structure
// ---------------------------------------------------------------------------

/// Read access to course structure.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Modules, lessons, their `order` and `quiz_id` fields.
    async fn fetch_course_structure(&self, course: CourseId) -> anyhow::Result<Course>;
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// Storage for authored quizzes.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Store a validated quiz, assigning ids where missing.
    async fn persist_quiz(&self, quiz: Quiz) -> anyhow::Result<QuizId>;

    /// Load a quiz by id; `Ok(None)` if it does not exist.
    async fn fetch_quiz(&self, id: QuizId) -> anyhow::Result<Option<Quiz>>;
}

// ---------------------------------------------------------------------------
// Learner activity
// ---------------------------------------------------------------------------

/// Append-only attempt log plus the "viewed" signal for quiz-less lessons.
#[async_trait]
pub trait AttemptLog: Send + Sync {
    /// Every attempt by `learner` on lessons of `course`, in submission order.
    async fn fetch_attempt_history(
        &self,
        learner: LearnerId,
        course: CourseId,
    ) -> anyhow::Result<Vec<AttemptResult>>;

    /// Append an attempt. Existing attempts are never modified.
    async fn persist_attempt(&self, attempt: AttemptResult) -> anyhow::Result<AttemptId>;

    /// Lessons the learner has opened. Stores that do not track views
    /// report none.
    async fn fetch_viewed_lessons(
        &self,
        _learner: LearnerId,
        _course: CourseId,
    ) -> anyhow::Result<HashSet<LessonId>> {
        Ok(HashSet::new())
    }
}
