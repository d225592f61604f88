//! The `coursegate grade` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use coursegate_core::config::load_config_from;
use coursegate_core::error::EngineError;
use coursegate_core::grading::grade_submission;
use coursegate_core::parser::{parse_answers, parse_quiz, QuizDefaults};
use coursegate_core::validation::{validate_quiz_draft, ValidationStage};

pub fn execute(
    quiz_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let draft = parse_quiz(&quiz_path, &QuizDefaults::from(&config))?;
    let quiz = validate_quiz_draft(&draft, ValidationStage::Finalize)
        .map_err(EngineError::Rejected)
        .with_context(|| format!("cannot grade against {}", quiz_path.display()))?;
    let answers = parse_answers(&answers_path)?;

    let result = grade_submission(&quiz, &answers)?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => {
            let verdict = if result.passed { "PASSED" } else { "FAILED" };
            println!("Quiz: {}", quiz.title);
            println!(
                "Score: {}/{} ({}%)",
                result.correct_count, result.total_count, result.percentage
            );
            println!("Threshold: {}%", quiz.pass_threshold);
            println!("Result: {verdict}");
        }
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}
