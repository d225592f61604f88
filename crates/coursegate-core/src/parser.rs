//! Quiz, course, attempt and answer file loading.
//!
//! Quizzes can be written as TOML (`[quiz]` header plus `[[questions]]`) or
//! as JSON in the shape of [`Quiz`]. Courses are JSON or TOML, attempt logs
//! and answer sheets are JSON. Malformed payloads are rejected here so the
//! engine only ever sees well-formed entities.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::CoursegateConfig;
use crate::grading::Answers;
use crate::ids::{AlternativeId, CourseId, LessonId, QuestionId, QuizId};
use crate::model::{Alternative, AttemptResult, Course, Question, Quiz, QuizScope};

/// Defaults applied to quiz files that leave fields out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizDefaults {
    pub pass_threshold: f64,
    pub max_attempts: Option<u32>,
}

impl Default for QuizDefaults {
    fn default() -> Self {
        QuizDefaults::from(&CoursegateConfig::default())
    }
}

impl From<&CoursegateConfig> for QuizDefaults {
    fn from(config: &CoursegateConfig) -> Self {
        Self {
            pass_threshold: config.default_pass_threshold,
            max_attempts: config.default_attempt_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// TOML quiz files
// ---------------------------------------------------------------------------

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    #[serde(default)]
    id: Option<u64>,
    title: String,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    pass_threshold: Option<f64>,
    #[serde(default)]
    max_attempts: Option<u32>,
    #[serde(default)]
    published: bool,
    #[serde(default)]
    course_id: Option<u64>,
    #[serde(default)]
    lesson_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    id: Option<u64>,
    statement: String,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    order: Option<i64>,
    #[serde(default)]
    alternatives: Vec<TomlAlternative>,
}

#[derive(Debug, Deserialize)]
struct TomlAlternative {
    #[serde(default)]
    id: Option<u64>,
    text: String,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    order: Option<i64>,
}

fn scope_from(header: &TomlQuizHeader) -> Result<QuizScope> {
    match (header.course_id, header.lesson_id) {
        (Some(course), None) => Ok(QuizScope::Course(CourseId(course))),
        (None, Some(lesson)) => Ok(QuizScope::Lesson(LessonId(lesson))),
        (Some(_), Some(_)) => {
            anyhow::bail!("quiz '{}' sets both course_id and lesson_id", header.title)
        }
        (None, None) => {
            anyhow::bail!("quiz '{}' needs either course_id or lesson_id", header.title)
        }
    }
}

/// Parse a TOML quiz string (useful for testing).
pub fn parse_quiz_toml_str(
    content: &str,
    source_path: &Path,
    defaults: &QuizDefaults,
) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let scope = scope_from(&parsed.quiz)?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id.map(QuestionId),
            statement: q.statement,
            weight: q.weight.unwrap_or(1.0),
            order: q.order,
            alternatives: q
                .alternatives
                .into_iter()
                .map(|a| Alternative {
                    id: a.id.map(AlternativeId),
                    text: a.text,
                    is_correct: a.is_correct,
                    order: a.order,
                })
                .collect(),
        })
        .collect();

    Ok(Quiz {
        id: parsed.quiz.id.map(QuizId),
        title: parsed.quiz.title,
        instructions: parsed.quiz.instructions,
        pass_threshold: parsed.quiz.pass_threshold.unwrap_or(defaults.pass_threshold),
        max_attempts: parsed.quiz.max_attempts.or(defaults.max_attempts),
        published: parsed.quiz.published,
        scope,
        questions,
    })
}

// ---------------------------------------------------------------------------
// JSON quiz files
// ---------------------------------------------------------------------------

/// Parse a JSON quiz string, filling in configured defaults.
pub fn parse_quiz_json_str(
    content: &str,
    source_path: &Path,
    defaults: &QuizDefaults,
) -> Result<Quiz> {
    let mut value: serde_json::Value = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;

    let object = value
        .as_object_mut()
        .with_context(|| format!("quiz file is not a JSON object: {}", source_path.display()))?;
    if object.get("pass_threshold").map_or(true, |v| v.is_null()) {
        object.insert(
            "pass_threshold".into(),
            serde_json::json!(defaults.pass_threshold),
        );
    }
    if let Some(max) = defaults.max_attempts {
        if object.get("max_attempts").map_or(true, |v| v.is_null()) {
            object.insert("max_attempts".into(), serde_json::json!(max));
        }
    }

    serde_json::from_value(value)
        .with_context(|| format!("invalid quiz in {}", source_path.display()))
}

/// Parse a single quiz file; the format follows the file extension.
pub fn parse_quiz(path: &Path, defaults: &QuizDefaults) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    match extension(path).as_deref() {
        Some("toml") => parse_quiz_toml_str(&content, path, defaults),
        Some("json") => parse_quiz_json_str(&content, path, defaults),
        _ => anyhow::bail!(
            "unsupported quiz file (expected .toml or .json): {}",
            path.display()
        ),
    }
}

/// Quizzes found under a directory, plus the files that failed to load.
#[derive(Debug, Default)]
pub struct QuizScan {
    pub quizzes: Vec<Quiz>,
    pub failures: Vec<QuizLoadFailure>,
}

#[derive(Debug)]
pub struct QuizLoadFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Recursively parse every `.toml` and `.json` file under `dir`, keeping
/// parse failures alongside the quizzes that loaded.
pub fn scan_quiz_directory(dir: &Path, defaults: &QuizDefaults) -> Result<QuizScan> {
    let mut scan = QuizScan::default();
    scan_into(dir, defaults, &mut scan)?;
    Ok(scan)
}

fn scan_into(dir: &Path, defaults: &QuizDefaults, scan: &mut QuizScan) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            scan_into(&path, defaults, scan)?;
        } else if matches!(extension(&path).as_deref(), Some("toml" | "json")) {
            match parse_quiz(&path, defaults) {
                Ok(quiz) => scan.quizzes.push(quiz),
                Err(error) => scan.failures.push(QuizLoadFailure { path, error }),
            }
        }
    }

    Ok(())
}

/// Recursively load all `.toml` and `.json` quiz files from a directory,
/// skipping files that fail to parse.
pub fn load_quiz_directory(dir: &Path, defaults: &QuizDefaults) -> Result<Vec<Quiz>> {
    let scan = scan_quiz_directory(dir, defaults)?;
    for failure in &scan.failures {
        tracing::warn!("skipping {}: {:#}", failure.path.display(), failure.error);
    }
    Ok(scan.quizzes)
}

/// Load one quiz file, or every quiz under a directory. A file that fails to
/// parse is reported rather than skipped.
pub fn scan_quizzes(path: &Path, defaults: &QuizDefaults) -> Result<QuizScan> {
    if path.is_dir() {
        return scan_quiz_directory(path, defaults);
    }
    anyhow::ensure!(path.exists(), "quiz file not found: {}", path.display());
    let mut scan = QuizScan::default();
    match parse_quiz(path, defaults) {
        Ok(quiz) => scan.quizzes.push(quiz),
        Err(error) => scan.failures.push(QuizLoadFailure {
            path: path.to_path_buf(),
            error,
        }),
    }
    Ok(scan)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

// ---------------------------------------------------------------------------
// Courses, attempts, answers
// ---------------------------------------------------------------------------

/// Parse a course structure file (JSON or TOML).
pub fn parse_course(path: &Path) -> Result<Course> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read course file: {}", path.display()))?;

    let course: Course = match extension(path).as_deref() {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))?,
    };

    check_course_links(&course)?;
    Ok(course)
}

/// Modules and lessons must point back at their parents.
fn check_course_links(course: &Course) -> Result<()> {
    for module in &course.modules {
        anyhow::ensure!(
            module.course_id == course.id,
            "module {} belongs to course {}, not {}",
            module.id,
            module.course_id,
            course.id
        );
        for lesson in &module.lessons {
            anyhow::ensure!(
                lesson.module_id == module.id,
                "lesson {} belongs to module {}, not {}",
                lesson.id,
                lesson.module_id,
                module.id
            );
        }
    }
    Ok(())
}

/// Parse an attempt log: a JSON array of attempts.
pub fn parse_attempts_str(content: &str) -> Result<Vec<AttemptResult>> {
    let attempts: Vec<AttemptResult> =
        serde_json::from_str(content).context("failed to parse attempt log JSON")?;
    for attempt in &attempts {
        anyhow::ensure!(
            attempt.percentage <= 100,
            "attempt on lesson {} has percentage {}",
            attempt.lesson_id,
            attempt.percentage
        );
    }
    Ok(attempts)
}

pub fn parse_attempts(path: &Path) -> Result<Vec<AttemptResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attempt log: {}", path.display()))?;
    parse_attempts_str(&content).with_context(|| format!("in {}", path.display()))
}

#[derive(Debug, Deserialize)]
struct AnswerEntry {
    question_id: QuestionId,
    alternative_id: AlternativeId,
}

/// Either `{"<question id>": <alternative id>}` or a list of
/// `{"question_id", "alternative_id"}` entries.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerSheet {
    // Keys stay strings: buffered untagged content cannot turn "1" into an integer.
    Map(HashMap<String, AlternativeId>),
    List(Vec<AnswerEntry>),
}

/// Parse an answer sheet.
pub fn parse_answers_str(content: &str) -> Result<Answers> {
    let sheet: AnswerSheet = serde_json::from_str(content).context(
        "answers must be a JSON object of question id -> alternative id, or a list of entries",
    )?;
    match sheet {
        AnswerSheet::Map(map) => {
            let mut answers = Answers::new();
            for (key, alternative) in map {
                let question: QuestionId = key
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!("invalid question id in answers: {e}"))?;
                if answers.insert(question, alternative).is_some() {
                    anyhow::bail!("question {question} is answered more than once");
                }
            }
            Ok(answers)
        }
        AnswerSheet::List(entries) => {
            let mut answers = Answers::new();
            for entry in entries {
                if answers
                    .insert(entry.question_id, entry.alternative_id)
                    .is_some()
                {
                    anyhow::bail!("question {} is answered more than once", entry.question_id);
                }
            }
            Ok(answers)
        }
    }
}

pub fn parse_answers(path: &Path) -> Result<Answers> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers: {}", path.display()))?;
    parse_answers_str(&content).with_context(|| format!("in {}", path.display()))
}
