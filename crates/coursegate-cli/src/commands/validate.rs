//! The `coursegate validate` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use coursegate_core::config::load_config_from;
use coursegate_core::error::ValidationIssue;
use coursegate_core::parser::{scan_quizzes, QuizDefaults};
use coursegate_core::validation::{validate_quiz_draft, ValidationStage};

#[derive(Serialize)]
struct ValidateReport {
    quizzes: Vec<QuizReport>,
    load_errors: Vec<LoadError>,
}

#[derive(Serialize)]
struct QuizReport {
    title: String,
    questions: usize,
    valid: bool,
    issues: Vec<ValidationIssue>,
}

#[derive(Serialize)]
struct LoadError {
    path: String,
    error: String,
}

pub fn execute(
    quiz_path: PathBuf,
    draft: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let scan = scan_quizzes(&quiz_path, &QuizDefaults::from(&config))?;
    anyhow::ensure!(
        !scan.quizzes.is_empty() || !scan.failures.is_empty(),
        "no quiz files found in {}",
        quiz_path.display()
    );

    let stage = if draft {
        ValidationStage::Draft
    } else {
        ValidationStage::Finalize
    };

    let report = ValidateReport {
        quizzes: scan
            .quizzes
            .iter()
            .map(|quiz| {
                let issues = validate_quiz_draft(quiz, stage).err().unwrap_or_default();
                QuizReport {
                    title: quiz.title.clone(),
                    questions: quiz.questions.len(),
                    valid: issues.is_empty(),
                    issues,
                }
            })
            .collect(),
        load_errors: scan
            .failures
            .iter()
            .map(|failure| LoadError {
                path: failure.path.display().to_string(),
                error: format!("{:#}", failure.error),
            })
            .collect(),
    };
    let total_issues = report.load_errors.len()
        + report.quizzes.iter().map(|r| r.issues.len()).sum::<usize>();

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => {
            for load_error in &report.load_errors {
                println!("File: {}", load_error.path);
                println!("  ERROR: {}", load_error.error);
            }
            for quiz in &report.quizzes {
                println!("Quiz: {} ({} questions)", quiz.title, quiz.questions);
                for issue in &quiz.issues {
                    println!("  ERROR: {issue}");
                }
            }
            if total_issues == 0 {
                println!("All quizzes valid.");
            } else {
                println!("\n{total_issues} issue(s) found.");
            }
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    if total_issues > 0 {
        anyhow::bail!("{total_issues} validation issue(s)");
    }
    Ok(())
}
