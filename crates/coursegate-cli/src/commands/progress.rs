//! The `coursegate progress` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use serde::Serialize;

use coursegate_core::config::load_config_from;
use coursegate_core::ids::{LearnerId, LessonId};
use coursegate_core::parser::{parse_attempts, parse_course};
use coursegate_core::progression::{CourseProgress, ProgressSummary};
use coursegate_core::service::CourseService;
use coursegate_core::store::InMemoryStore;

#[derive(Serialize)]
struct ProgressReport<'a> {
    progress: &'a CourseProgress,
    summary: ProgressSummary,
    next_lesson: Option<LessonId>,
}

pub async fn execute(
    course_path: PathBuf,
    attempts_path: PathBuf,
    learner: u64,
    viewed: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let course = parse_course(&course_path)?;
    let course_id = course.id;
    let attempts = parse_attempts(&attempts_path)?;
    let learner = LearnerId(learner);
    tracing::debug!(
        course = %course_id,
        attempts = attempts.len(),
        "loaded course and attempt log"
    );

    let store = Arc::new(InMemoryStore::new().with_course(course));
    store.extend_attempts(attempts);
    for lesson in parse_viewed(viewed.as_deref())? {
        store.mark_viewed(learner, lesson);
    }

    let service = CourseService::new(
        store.clone(),
        store.clone(),
        store,
        config.service_config(),
    );
    let progress = service.progress(course_id, learner).await?;

    match format.as_str() {
        "json" => {
            let report = ProgressReport {
                progress: &progress,
                summary: progress.summary(),
                next_lesson: progress.next_lesson(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "table" => print_table(&progress),
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn parse_viewed(viewed: Option<&str>) -> Result<Vec<LessonId>> {
    let Some(list) = viewed else {
        return Ok(Vec::new());
    };
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<LessonId>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid lesson id in --viewed: '{s}'"))
        })
        .collect()
}

fn print_table(progress: &CourseProgress) {
    let mut table = Table::new();
    table.set_header(vec![
        "Module",
        "Lesson",
        "Status",
        "Passed",
        "Last Score",
        "Attempts",
    ]);

    for module in &progress.modules {
        for lesson in &module.lessons {
            table.add_row(vec![
                Cell::new(module.module_id),
                Cell::new(lesson.lesson_id),
                Cell::new(lesson.status),
                Cell::new(if lesson.passed { "yes" } else { "no" }),
                Cell::new(
                    lesson
                        .last_percentage
                        .map(|p| format!("{p}%"))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::new(lesson.attempt_count),
            ]);
        }
    }

    println!("{table}");

    let summary = progress.summary();
    println!(
        "Course {}: {} ({}/{} lessons, {}%)",
        progress.course_id,
        progress.status,
        summary.completed_lessons,
        summary.total_lessons,
        summary.percent_complete
    );
    match progress.next_lesson() {
        Some(lesson) => println!("Next lesson: {lesson}"),
        None => println!("Next lesson: none"),
    }
}
