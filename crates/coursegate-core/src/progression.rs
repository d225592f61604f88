//! Learner progression: which lessons are locked, available or completed.
//!
//! Progress is a pure projection of course structure plus attempt history.
//! Nothing is stored; recomputing from the same inputs always gives the same
//! answer, and adding attempts never takes a completion away.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::grading::round_half_up_percent;
use crate::ids::{CourseId, LearnerId, LessonId, ModuleId};
use crate::model::{AttemptResult, Course, Lesson};
use crate::sequencing::sorted;

/// Status of a lesson, module or course for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Locked,
    Available,
    Completed,
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Locked => write!(f, "locked"),
            ProgressStatus::Available => write!(f, "available"),
            ProgressStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Derived status of one lesson for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub learner_id: LearnerId,
    pub status: ProgressStatus,
    /// Some attempt on this lesson passed.
    pub passed: bool,
    /// Percentage of the most recent attempt, if any.
    pub last_percentage: Option<u32>,
    pub attempt_count: u32,
}

/// Roll-up of a module's lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub status: ProgressStatus,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    /// Lessons in sequencing order.
    pub lessons: Vec<LessonProgress>,
}

/// Full progress of one learner through one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub course_id: CourseId,
    pub learner_id: LearnerId,
    pub status: ProgressStatus,
    /// Modules in sequencing order.
    pub modules: Vec<ModuleProgress>,
}

/// Counts suitable for dashboards and approval reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub completed_modules: usize,
    pub in_progress_modules: usize,
    pub total_modules: usize,
    pub percent_complete: u32,
}

impl CourseProgress {
    /// Every lesson, in sequencing order.
    pub fn lessons(&self) -> impl Iterator<Item = &LessonProgress> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }

    /// Progress of a single lesson.
    pub fn lesson(&self, id: LessonId) -> Option<&LessonProgress> {
        self.lessons().find(|l| l.lesson_id == id)
    }

    pub fn status_of(&self, id: LessonId) -> Option<ProgressStatus> {
        self.lesson(id).map(|l| l.status)
    }

    /// Map of lesson id to progress.
    pub fn by_lesson(&self) -> HashMap<LessonId, LessonProgress> {
        self.lessons().map(|l| (l.lesson_id, l.clone())).collect()
    }

    /// The first lesson the learner can work on next.
    pub fn next_lesson(&self) -> Option<LessonId> {
        self.lessons()
            .find(|l| l.status == ProgressStatus::Available)
            .map(|l| l.lesson_id)
    }

    pub fn summary(&self) -> ProgressSummary {
        let total_lessons = self.modules.iter().map(|m| m.total_lessons).sum();
        let completed_lessons = self.modules.iter().map(|m| m.completed_lessons).sum();
        let completed_modules = self
            .modules
            .iter()
            .filter(|m| m.status == ProgressStatus::Completed)
            .count();
        let in_progress_modules = self
            .modules
            .iter()
            .filter(|m| m.status == ProgressStatus::Available)
            .count();

        ProgressSummary {
            completed_lessons,
            total_lessons,
            completed_modules,
            in_progress_modules,
            total_modules: self.modules.len(),
            percent_complete: round_half_up_percent(completed_lessons as f64, total_lessons as f64),
        }
    }
}

/// What the attempt history says about one lesson.
#[derive(Debug, Default)]
struct LessonHistory<'a> {
    ever_passed: bool,
    latest: Option<&'a AttemptResult>,
    count: u32,
}

fn index_attempts(
    learner: LearnerId,
    attempts: &[AttemptResult],
) -> HashMap<LessonId, LessonHistory<'_>> {
    let mut by_lesson: HashMap<LessonId, LessonHistory<'_>> = HashMap::new();
    for attempt in attempts.iter().filter(|a| a.learner_id == learner) {
        let entry = by_lesson.entry(attempt.lesson_id).or_default();
        entry.count += 1;
        entry.ever_passed |= attempt.passed;
        // Ties on timestamp go to the later entry in the log.
        if entry
            .latest
            .map_or(true, |latest| attempt.timestamp >= latest.timestamp)
        {
            entry.latest = Some(attempt);
        }
    }
    by_lesson
}

/// Compute a learner's progress through a course.
///
/// `attempts` may contain other learners' attempts; only `learner`'s count.
/// `viewed` holds lessons the learner has opened, which completes lessons
/// that carry no quiz once they are reachable.
pub fn compute_progress(
    course: &Course,
    learner: LearnerId,
    attempts: &[AttemptResult],
    viewed: &HashSet<LessonId>,
) -> CourseProgress {
    let history = index_attempts(learner, attempts);

    // The gate carries across module boundaries: the first lesson of a module
    // depends on the last lesson of the previous one.
    let mut predecessor_completed = true;
    let mut modules = Vec::with_capacity(course.modules.len());

    for module in sorted(&course.modules) {
        let mut lessons = Vec::with_capacity(module.lessons.len());
        for lesson in sorted(&module.lessons) {
            let lesson_history = history.get(&lesson.id);
            let status = lesson_status(lesson, predecessor_completed, lesson_history, viewed);
            predecessor_completed = status == ProgressStatus::Completed;

            lessons.push(LessonProgress {
                lesson_id: lesson.id,
                learner_id: learner,
                status,
                passed: lesson_history.is_some_and(|h| h.ever_passed),
                last_percentage: lesson_history.and_then(|h| h.latest).map(|a| a.percentage),
                attempt_count: lesson_history.map_or(0, |h| h.count),
            });
        }

        let completed_lessons = lessons
            .iter()
            .filter(|l| l.status == ProgressStatus::Completed)
            .count();
        let status = roll_up(lessons.iter().map(|l| l.status));
        modules.push(ModuleProgress {
            module_id: module.id,
            status,
            completed_lessons,
            total_lessons: lessons.len(),
            lessons,
        });
    }

    let status = roll_up(modules.iter().map(|m| m.status));

    tracing::debug!(
        course = %course.id,
        learner = %learner,
        status = %status,
        "computed progress"
    );

    CourseProgress {
        course_id: course.id,
        learner_id: learner,
        status,
        modules,
    }
}

fn lesson_status(
    lesson: &Lesson,
    predecessor_completed: bool,
    history: Option<&LessonHistory<'_>>,
    viewed: &HashSet<LessonId>,
) -> ProgressStatus {
    // A pass is never revoked, whatever happened before or after it.
    if history.is_some_and(|h| h.ever_passed) {
        return ProgressStatus::Completed;
    }

    if !predecessor_completed {
        return ProgressStatus::Locked;
    }

    if !lesson.has_quiz() && viewed.contains(&lesson.id) {
        ProgressStatus::Completed
    } else {
        ProgressStatus::Available
    }
}

/// Completed if everything is; Locked if everything is; Available otherwise.
/// An empty group counts as completed.
fn roll_up(statuses: impl Iterator<Item = ProgressStatus>) -> ProgressStatus {
    let mut all_completed = true;
    let mut all_locked = true;
    let mut any = false;
    for status in statuses {
        any = true;
        all_completed &= status == ProgressStatus::Completed;
        all_locked &= status == ProgressStatus::Locked;
    }
    if all_completed {
        ProgressStatus::Completed
    } else if any && all_locked {
        ProgressStatus::Locked
    } else {
        ProgressStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::QuizId;
    use crate::model::Module;
    use chrono::{TimeZone, Utc};

    const LEARNER: LearnerId = LearnerId(1);

    fn lesson(id: u64, module: u64, order: Option<i64>, quiz: bool) -> Lesson {
        Lesson {
            id: LessonId(id),
            module_id: ModuleId(module),
            title: format!("lesson {id}"),
            order,
            quiz_id: quiz.then_some(QuizId(100 + id)),
        }
    }

    /// Two modules, two quiz lessons each: lessons 1,2 in module 1; 3,4 in module 2.
    fn two_by_two() -> Course {
        Course {
            id: CourseId(1),
            title: "course".into(),
            modules: vec![
                Module {
                    id: ModuleId(2),
                    course_id: CourseId(1),
                    title: "second".into(),
                    order: Some(2),
                    lessons: vec![lesson(4, 2, Some(2), true), lesson(3, 2, Some(1), true)],
                },
                Module {
                    id: ModuleId(1),
                    course_id: CourseId(1),
                    title: "first".into(),
                    order: Some(1),
                    lessons: vec![lesson(1, 1, Some(1), true), lesson(2, 1, Some(2), true)],
                },
            ],
        }
    }

    fn attempt(lesson: u64, passed: bool, minute: u32) -> AttemptResult {
        AttemptResult {
            lesson_id: LessonId(lesson),
            learner_id: LEARNER,
            percentage: if passed { 100 } else { 40 },
            passed,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap(),
        }
    }

    fn statuses(progress: &CourseProgress) -> Vec<(u64, ProgressStatus)> {
        progress
            .lessons()
            .map(|l| (l.lesson_id.value(), l.status))
            .collect()
    }

    #[test]
    fn fresh_learner_sees_only_first_lesson() {
        let progress = compute_progress(&two_by_two(), LEARNER, &[], &HashSet::new());
        assert_eq!(
            statuses(&progress),
            vec![
                (1, ProgressStatus::Available),
                (2, ProgressStatus::Locked),
                (3, ProgressStatus::Locked),
                (4, ProgressStatus::Locked),
            ]
        );
        assert_eq!(progress.modules[0].status, ProgressStatus::Available);
        assert_eq!(progress.modules[1].status, ProgressStatus::Locked);
        assert_eq!(progress.next_lesson(), Some(LessonId(1)));
    }

    #[test]
    fn passed_three_of_four() {
        let attempts = vec![attempt(1, true, 1), attempt(2, true, 2), attempt(3, true, 3)];
        let progress = compute_progress(&two_by_two(), LEARNER, &attempts, &HashSet::new());

        assert_eq!(progress.status_of(LessonId(4)), Some(ProgressStatus::Available));
        let module_two = progress
            .modules
            .iter()
            .find(|m| m.module_id == ModuleId(2))
            .unwrap();
        assert_ne!(module_two.status, ProgressStatus::Completed);
        assert_eq!(progress.modules[0].status, ProgressStatus::Completed);

        // Nothing locked sits before a completed lesson.
        let ordered = statuses(&progress);
        let last_completed = ordered
            .iter()
            .rposition(|(_, s)| *s == ProgressStatus::Completed)
            .unwrap();
        assert!(ordered[..last_completed]
            .iter()
            .all(|(_, s)| *s != ProgressStatus::Locked));
    }

    #[test]
    fn failing_attempt_keeps_next_locked() {
        let attempts = vec![attempt(1, false, 1)];
        let progress = compute_progress(&two_by_two(), LEARNER, &attempts, &HashSet::new());
        assert_eq!(progress.status_of(LessonId(1)), Some(ProgressStatus::Available));
        assert_eq!(progress.status_of(LessonId(2)), Some(ProgressStatus::Locked));
        let first = progress.lesson(LessonId(1)).unwrap();
        assert_eq!(first.attempt_count, 1);
        assert_eq!(first.last_percentage, Some(40));
        assert!(!first.passed);
    }

    #[test]
    fn later_failure_does_not_revoke_completion() {
        let attempts = vec![attempt(1, true, 1), attempt(1, false, 5)];
        let progress = compute_progress(&two_by_two(), LEARNER, &attempts, &HashSet::new());
        let first = progress.lesson(LessonId(1)).unwrap();
        assert_eq!(first.status, ProgressStatus::Completed);
        assert_eq!(first.last_percentage, Some(40));
        assert_eq!(first.attempt_count, 2);
        assert_eq!(progress.status_of(LessonId(2)), Some(ProgressStatus::Available));
    }

    #[test]
    fn completion_is_monotonic_under_added_attempts() {
        let course = two_by_two();
        let base = vec![attempt(1, true, 1), attempt(3, true, 2)];
        let before = compute_progress(&course, LEARNER, &base, &HashSet::new());

        let extras = [
            attempt(1, false, 10),
            attempt(2, false, 11),
            attempt(3, false, 12),
            attempt(4, true, 13),
            attempt(2, true, 14),
        ];
        let mut grown = base.clone();
        for extra in extras {
            grown.push(extra);
            let after = compute_progress(&course, LEARNER, &grown, &HashSet::new());
            for lesson in before.lessons() {
                if lesson.status == ProgressStatus::Completed {
                    assert_eq!(
                        after.status_of(lesson.lesson_id),
                        Some(ProgressStatus::Completed)
                    );
                }
            }
        }
    }

    #[test]
    fn pass_out_of_sequence_still_completes() {
        let attempts = vec![attempt(3, true, 1)];
        let progress = compute_progress(&two_by_two(), LEARNER, &attempts, &HashSet::new());
        assert_eq!(progress.status_of(LessonId(3)), Some(ProgressStatus::Completed));
        // Lesson 4 follows a completed lesson.
        assert_eq!(progress.status_of(LessonId(4)), Some(ProgressStatus::Available));
        assert_eq!(progress.status_of(LessonId(2)), Some(ProgressStatus::Locked));
    }

    #[test]
    fn other_learners_attempts_are_ignored() {
        let mut foreign = attempt(1, true, 1);
        foreign.learner_id = LearnerId(99);
        let progress = compute_progress(&two_by_two(), LEARNER, &[foreign], &HashSet::new());
        assert_eq!(progress.status_of(LessonId(1)), Some(ProgressStatus::Available));
        assert_eq!(progress.lesson(LessonId(1)).unwrap().attempt_count, 0);
    }

    #[test]
    fn quizless_lesson_completes_once_viewed_and_reachable() {
        let course = Course {
            id: CourseId(1),
            title: String::new(),
            modules: vec![Module {
                id: ModuleId(1),
                course_id: CourseId(1),
                title: String::new(),
                order: Some(1),
                lessons: vec![
                    lesson(1, 1, Some(1), false),
                    lesson(2, 1, Some(2), false),
                    lesson(3, 1, Some(3), true),
                ],
            }],
        };

        // Viewing lesson 2 while it is locked does nothing.
        let viewed: HashSet<LessonId> = [LessonId(2)].into_iter().collect();
        let progress = compute_progress(&course, LEARNER, &[], &viewed);
        assert_eq!(progress.status_of(LessonId(1)), Some(ProgressStatus::Available));
        assert_eq!(progress.status_of(LessonId(2)), Some(ProgressStatus::Locked));

        let viewed: HashSet<LessonId> = [LessonId(1), LessonId(2)].into_iter().collect();
        let progress = compute_progress(&course, LEARNER, &[], &viewed);
        assert_eq!(progress.status_of(LessonId(1)), Some(ProgressStatus::Completed));
        assert_eq!(progress.status_of(LessonId(2)), Some(ProgressStatus::Completed));
        assert_eq!(progress.status_of(LessonId(3)), Some(ProgressStatus::Available));
    }

    #[test]
    fn empty_module_does_not_break_the_chain() {
        let mut course = two_by_two();
        course.modules.push(Module {
            id: ModuleId(3),
            course_id: CourseId(1),
            title: "empty".into(),
            order: Some(1),
            lessons: vec![],
        });
        course.modules[1].order = Some(0);

        let attempts = vec![attempt(1, true, 1), attempt(2, true, 2)];
        let progress = compute_progress(&course, LEARNER, &attempts, &HashSet::new());
        assert_eq!(progress.status_of(LessonId(3)), Some(ProgressStatus::Available));
        let empty = progress
            .modules
            .iter()
            .find(|m| m.module_id == ModuleId(3))
            .unwrap();
        assert_eq!(empty.status, ProgressStatus::Completed);
    }

    #[test]
    fn course_completes_when_every_lesson_does() {
        let attempts: Vec<_> = (1..=4).map(|l| attempt(l, true, l as u32)).collect();
        let progress = compute_progress(&two_by_two(), LEARNER, &attempts, &HashSet::new());
        assert_eq!(progress.status, ProgressStatus::Completed);
        assert_eq!(progress.next_lesson(), None);

        let summary = progress.summary();
        assert_eq!(summary.completed_lessons, 4);
        assert_eq!(summary.completed_modules, 2);
        assert_eq!(summary.percent_complete, 100);
    }

    #[test]
    fn summary_counts_partial_progress() {
        let attempts = vec![attempt(1, true, 1)];
        let progress = compute_progress(&two_by_two(), LEARNER, &attempts, &HashSet::new());
        let summary = progress.summary();
        assert_eq!(summary.completed_lessons, 1);
        assert_eq!(summary.total_lessons, 4);
        assert_eq!(summary.completed_modules, 0);
        assert_eq!(summary.in_progress_modules, 1);
        assert_eq!(summary.total_modules, 2);
        assert_eq!(summary.percent_complete, 25);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let attempts = vec![attempt(2, true, 3), attempt(1, true, 1)];
        let course = two_by_two();
        let a = compute_progress(&course, LEARNER, &attempts, &HashSet::new());
        let b = compute_progress(&course, LEARNER, &attempts, &HashSet::new());
        assert_eq!(a, b);
    }
}
