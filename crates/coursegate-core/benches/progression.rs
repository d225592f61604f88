use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coursegate_core::ids::{CourseId, LearnerId, LessonId, ModuleId, QuizId};
use coursegate_core::model::{AttemptResult, Course, Lesson, Module};
use coursegate_core::progression::compute_progress;
use coursegate_core::sequencing::{order_of, Sibling};

fn make_course(modules: u64, lessons_per_module: u64) -> Course {
    Course {
        id: CourseId(1),
        title: "bench".into(),
        modules: (1..=modules)
            .map(|m| Module {
                id: ModuleId(m),
                course_id: CourseId(1),
                title: format!("module {m}"),
                order: Some((modules - m) as i64),
                lessons: (1..=lessons_per_module)
                    .map(|l| {
                        let id = m * 1000 + l;
                        Lesson {
                            id: LessonId(id),
                            module_id: ModuleId(m),
                            title: format!("lesson {id}"),
                            order: Some(l as i64),
                            quiz_id: (l % 2 == 0).then_some(QuizId(id)),
                        }
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Three attempts per lesson for the first half of the course.
fn make_attempts(course: &Course, learner: LearnerId) -> Vec<AttemptResult> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let lessons: Vec<LessonId> = course
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter().map(|l| l.id))
        .collect();
    lessons[..lessons.len() / 2]
        .iter()
        .enumerate()
        .flat_map(|(i, &lesson_id)| {
            (0..3).map(move |n| AttemptResult {
                lesson_id,
                learner_id: learner,
                percentage: 40 + n * 30,
                passed: n == 2,
                timestamp: start + Duration::minutes((i * 3) as i64 + n as i64),
            })
        })
        .collect()
}

fn bench_compute_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_progress");
    let learner = LearnerId(1);

    for (modules, lessons) in [(5u64, 5u64), (20, 25)] {
        let course = make_course(modules, lessons);
        let attempts = make_attempts(&course, learner);
        let viewed: HashSet<LessonId> = course
            .modules
            .iter()
            .flat_map(|m| m.lessons.iter().map(|l| l.id))
            .collect();
        group.bench_function(format!("{modules}x{lessons}"), |b| {
            b.iter(|| {
                compute_progress(
                    black_box(&course),
                    learner,
                    black_box(&attempts),
                    black_box(&viewed),
                )
            })
        });
    }

    group.finish();
}

fn bench_order_of(c: &mut Criterion) {
    let siblings: Vec<Sibling> = (0..1000u64)
        .map(|id| Sibling {
            order: (id % 7 != 0).then_some((id % 50) as i64),
            id,
        })
        .collect();

    c.bench_function("order_of/1000", |b| {
        b.iter(|| order_of(black_box(&siblings)))
    });
}

criterion_group!(benches, bench_compute_progress, bench_order_of);
criterion_main!(benches);
