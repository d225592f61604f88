use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coursegate_core::grading::{grade_submission, Answers};
use coursegate_core::ids::{AlternativeId, LessonId, QuestionId};
use coursegate_core::model::{Alternative, Question, Quiz, QuizScope};
use coursegate_core::validation::{validate_quiz_draft, ValidationStage};

fn make_quiz(questions: u64, weighted: bool) -> Quiz {
    Quiz {
        id: None,
        title: "bench".into(),
        instructions: None,
        pass_threshold: 70.0,
        max_attempts: None,
        published: true,
        scope: QuizScope::Lesson(LessonId(1)),
        questions: (1..=questions)
            .map(|q| Question {
                id: Some(QuestionId(q)),
                statement: format!("question {q}"),
                weight: if weighted { (q % 3 + 1) as f64 } else { 1.0 },
                order: Some((questions - q) as i64),
                alternatives: (0..4)
                    .map(|a| Alternative {
                        id: Some(AlternativeId(q * 10 + a)),
                        text: format!("alternative {a}"),
                        is_correct: a == 0,
                        order: Some(a as i64),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn half_correct(quiz: &Quiz) -> Answers {
    quiz.questions
        .iter()
        .filter_map(|q| {
            let id = q.id?;
            let pick = if id.value() % 2 == 0 { 0 } else { 1 };
            Some((id, AlternativeId(id.value() * 10 + pick)))
        })
        .collect()
}

fn bench_grade(c: &mut Criterion) {
    let mut group = c.benchmark_group("grade_submission");

    for size in [10u64, 100, 1000] {
        let quiz = make_quiz(size, false);
        let answers = half_correct(&quiz);
        group.bench_function(format!("unweighted/{size}"), |b| {
            b.iter(|| grade_submission(black_box(&quiz), black_box(&answers)))
        });
    }

    let quiz = make_quiz(100, true);
    let answers = half_correct(&quiz);
    group.bench_function("weighted/100", |b| {
        b.iter(|| grade_submission(black_box(&quiz), black_box(&answers)))
    });

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_quiz_draft");

    for size in [10u64, 100] {
        let quiz = make_quiz(size, false);
        group.bench_function(format!("finalize/{size}"), |b| {
            b.iter(|| validate_quiz_draft(black_box(&quiz), ValidationStage::Finalize))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_grade, bench_validate);
criterion_main!(benches);
