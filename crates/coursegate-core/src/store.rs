//! In-memory implementation of the boundary traits.
//!
//! Backs the service in tests and lets the CLI run the full submission flow
//! over files without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;

use crate::ids::{AlternativeId, AttemptId, CourseId, LearnerId, LessonId, QuestionId, QuizId};
use crate::model::{AttemptResult, Course, Quiz};
use crate::traits::{AttemptLog, CourseCatalog, QuizStore};

/// Thread-safe store holding courses, quizzes, attempts and lesson views.
#[derive(Default)]
pub struct InMemoryStore {
    courses: Mutex<HashMap<CourseId, Course>>,
    quizzes: Mutex<HashMap<QuizId, Quiz>>,
    attempts: Mutex<Vec<AttemptResult>>,
    views: Mutex<HashMap<LearnerId, HashSet<LessonId>>>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a course structure.
    pub fn with_course(self, course: Course) -> Self {
        self.insert_course(course);
        self
    }

    pub fn insert_course(&self, course: Course) {
        self.courses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(course.id, course);
    }

    /// Seed previously recorded attempts.
    pub fn extend_attempts(&self, attempts: impl IntoIterator<Item = AttemptResult>) {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(attempts);
    }

    /// Record that a learner opened a lesson.
    pub fn mark_viewed(&self, learner: LearnerId, lesson: LessonId) {
        self.views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(learner)
            .or_default()
            .insert(lesson);
    }

    /// Number of attempts stored, across all learners.
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lessons_of(&self, course: CourseId) -> anyhow::Result<HashSet<LessonId>> {
        let courses = self.courses.lock().unwrap_or_else(|e| e.into_inner());
        let course = courses
            .get(&course)
            .with_context(|| format!("course {course} not found"))?;
        Ok(course
            .modules
            .iter()
            .flat_map(|m| m.lessons.iter().map(|l| l.id))
            .collect())
    }
}

#[async_trait]
impl CourseCatalog for InMemoryStore {
    async fn fetch_course_structure(&self, course: CourseId) -> anyhow::Result<Course> {
        self.courses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&course)
            .cloned()
            .with_context(|| format!("course {course} not found"))
    }
}

#[async_trait]
impl QuizStore for InMemoryStore {
    async fn persist_quiz(&self, mut quiz: Quiz) -> anyhow::Result<QuizId> {
        let id = match quiz.id {
            Some(id) => id,
            None => QuizId(self.next_id()),
        };
        quiz.id = Some(id);

        for question in &mut quiz.questions {
            if question.id.is_none() {
                question.id = Some(QuestionId(self.next_id()));
            }
            for alternative in &mut question.alternatives {
                if alternative.id.is_none() {
                    alternative.id = Some(AlternativeId(self.next_id()));
                }
            }
        }

        self.quizzes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, quiz);
        Ok(id)
    }

    async fn fetch_quiz(&self, id: QuizId) -> anyhow::Result<Option<Quiz>> {
        Ok(self
            .quizzes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }
}

#[async_trait]
impl AttemptLog for InMemoryStore {
    async fn fetch_attempt_history(
        &self,
        learner: LearnerId,
        course: CourseId,
    ) -> anyhow::Result<Vec<AttemptResult>> {
        let lessons = self.lessons_of(course)?;
        Ok(self
            .attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|a| a.learner_id == learner && lessons.contains(&a.lesson_id))
            .cloned()
            .collect())
    }

    async fn persist_attempt(&self, attempt: AttemptResult) -> anyhow::Result<AttemptId> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(attempt);
        Ok(AttemptId::new_v4())
    }

    async fn fetch_viewed_lessons(
        &self,
        learner: LearnerId,
        course: CourseId,
    ) -> anyhow::Result<HashSet<LessonId>> {
        let lessons = self.lessons_of(course)?;
        Ok(self
            .views
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&learner)
            .map(|viewed| viewed.intersection(&lessons).copied().collect())
            .unwrap_or_default())
    }
}
