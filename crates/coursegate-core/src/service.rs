//! Orchestration between the boundary traits and the pure engine.
//!
//! Loads what a request needs, runs validation, grading or progression on
//! it, and writes back the results. All decisions are made by the pure
//! functions; this layer only sequences the I/O.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grading::{check_attempt_allowed, grade_submission, Answers, GradeResult};
use crate::ids::{AttemptId, CourseId, LearnerId, LessonId, QuizId};
use crate::model::{AttemptResult, Course, Quiz, QuizScope};
use crate::progression::{compute_progress, CourseProgress, ProgressStatus};
use crate::traits::{AttemptLog, CourseCatalog, QuizStore};
use crate::validation::{validate_quiz_draft, ValidationStage};

/// Behaviour switches for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Refuse submissions against quizzes that are not published.
    pub require_published: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            require_published: true,
        }
    }
}

/// What a learner gets back after submitting answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub attempt_id: AttemptId,
    pub grade: GradeResult,
    /// Status of the submitted lesson after recording the attempt.
    pub lesson_status: ProgressStatus,
    /// Where the learner can continue, if anywhere.
    pub next_lesson: Option<LessonId>,
}

/// The engine service.
pub struct CourseService {
    catalog: Arc<dyn CourseCatalog>,
    quizzes: Arc<dyn QuizStore>,
    attempts: Arc<dyn AttemptLog>,
    config: ServiceConfig,
}

fn store_error(e: anyhow::Error) -> EngineError {
    EngineError::Store(format!("{e:#}"))
}

impl CourseService {
    pub fn new(
        catalog: Arc<dyn CourseCatalog>,
        quizzes: Arc<dyn QuizStore>,
        attempts: Arc<dyn AttemptLog>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            catalog,
            quizzes,
            attempts,
            config,
        }
    }

    /// Save work in progress. The quiz stays unpublished.
    pub async fn save_draft(&self, draft: &Quiz) -> Result<QuizId, EngineError> {
        let mut quiz =
            validate_quiz_draft(draft, ValidationStage::Draft).map_err(EngineError::Rejected)?;
        quiz.published = false;
        self.quizzes.persist_quiz(quiz).await.map_err(store_error)
    }

    /// Finalize and publish a quiz for learners.
    pub async fn publish_quiz(&self, draft: &Quiz) -> Result<QuizId, EngineError> {
        let mut quiz = validate_quiz_draft(draft, ValidationStage::Finalize)
            .map_err(EngineError::Rejected)?;
        quiz.published = true;
        let id = self.quizzes.persist_quiz(quiz).await.map_err(store_error)?;
        tracing::info!(quiz = %id, "published quiz");
        Ok(id)
    }

    /// Compute a learner's progress through a course.
    pub async fn progress(
        &self,
        course_id: CourseId,
        learner: LearnerId,
    ) -> Result<CourseProgress, EngineError> {
        let course = self.fetch_course(course_id).await?;
        self.progress_in(&course, learner).await
    }

    /// Progress for several learners, fetched concurrently. Results follow
    /// the order of `learners`.
    pub async fn progress_for_learners(
        &self,
        course_id: CourseId,
        learners: &[LearnerId],
    ) -> Result<Vec<CourseProgress>, EngineError> {
        let course = self.fetch_course(course_id).await?;

        let mut pending: FuturesUnordered<_> = learners
            .iter()
            .enumerate()
            .map(|(index, &learner)| {
                let course = &course;
                async move { (index, self.progress_in(course, learner).await) }
            })
            .collect();

        let mut results: Vec<Option<CourseProgress>> = vec![None; learners.len()];
        while let Some((index, progress)) = pending.next().await {
            results[index] = Some(progress?);
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Grade a learner's answers for a lesson quiz and record the attempt.
    pub async fn submit(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
        learner: LearnerId,
        answers: &Answers,
    ) -> Result<SubmissionOutcome, EngineError> {
        let course = self.fetch_course(course_id).await?;
        let lesson = course
            .lesson(lesson_id)
            .ok_or(EngineError::UnknownLesson(lesson_id))?;
        let quiz_id = lesson
            .quiz_id
            .ok_or(EngineError::NoQuizForLesson(lesson_id))?;
        let quiz = self
            .quizzes
            .fetch_quiz(quiz_id)
            .await
            .map_err(store_error)?
            .ok_or(EngineError::UnknownQuiz(quiz_id))?;

        if quiz.scope != QuizScope::Lesson(lesson_id) {
            return Err(EngineError::InvalidInput(format!(
                "lesson {lesson_id} points at quiz {quiz_id}, which belongs to {:?}",
                quiz.scope
            )));
        }

        if self.config.require_published && !quiz.published {
            tracing::warn!(quiz = %quiz_id, lesson = %lesson_id, "submission against unpublished quiz");
            return Err(EngineError::QuizNotPublished(quiz_id));
        }

        let before = self.progress_in(&course, learner).await?;
        let current = before
            .lesson(lesson_id)
            .ok_or(EngineError::UnknownLesson(lesson_id))?;
        if current.status == ProgressStatus::Locked {
            tracing::warn!(lesson = %lesson_id, learner = %learner, "submission against locked lesson");
            return Err(EngineError::LessonLocked(lesson_id));
        }
        check_attempt_allowed(&quiz, current.attempt_count)?;

        let grade = grade_submission(&quiz, answers)?;
        let attempt = AttemptResult {
            lesson_id,
            learner_id: learner,
            percentage: grade.percentage,
            passed: grade.passed,
            timestamp: Utc::now(),
        };
        let attempt_id = self
            .attempts
            .persist_attempt(attempt)
            .await
            .map_err(store_error)?;

        tracing::info!(
            attempt = %attempt_id,
            lesson = %lesson_id,
            learner = %learner,
            percentage = grade.percentage,
            passed = grade.passed,
            "recorded attempt"
        );

        let after = self.progress_in(&course, learner).await?;
        let lesson_status = after
            .status_of(lesson_id)
            .ok_or(EngineError::UnknownLesson(lesson_id))?;

        Ok(SubmissionOutcome {
            attempt_id,
            grade,
            lesson_status,
            next_lesson: after.next_lesson(),
        })
    }

    async fn fetch_course(&self, course_id: CourseId) -> Result<Course, EngineError> {
        self.catalog
            .fetch_course_structure(course_id)
            .await
            .map_err(store_error)
    }

    async fn progress_in(
        &self,
        course: &Course,
        learner: LearnerId,
    ) -> Result<CourseProgress, EngineError> {
        let history = self
            .attempts
            .fetch_attempt_history(learner, course.id)
            .await
            .map_err(store_error)?;
        let viewed = self
            .attempts
            .fetch_viewed_lessons(learner, course.id)
            .await
            .map_err(store_error)?;
        Ok(compute_progress(course, learner, &history, &viewed))
    }
}
