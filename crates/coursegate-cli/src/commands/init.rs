//! The `coursegate init` command.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};

use coursegate_core::config::CoursegateConfig;
use coursegate_core::ids::{LearnerId, LessonId};
use coursegate_core::model::AttemptResult;

pub fn execute() -> Result<()> {
    let config = format!(
        "# coursegate configuration\n\n{}",
        toml::to_string_pretty(&CoursegateConfig::default())?
    );
    write_if_missing(Path::new("coursegate.toml"), &config)?;

    std::fs::create_dir_all("quizzes")?;
    write_if_missing(Path::new("quizzes/example.toml"), EXAMPLE_QUIZ)?;
    write_if_missing(Path::new("course.json"), EXAMPLE_COURSE)?;
    write_if_missing(Path::new("answers.json"), EXAMPLE_ANSWERS)?;
    write_if_missing(Path::new("attempts.json"), &example_attempts()?)?;

    println!("\nNext steps:");
    println!("  1. Run: coursegate validate --quiz quizzes");
    println!("  2. Run: coursegate grade --quiz quizzes/example.toml --answers answers.json");
    println!("  3. Run: coursegate progress --course course.json --attempts attempts.json --learner 1");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

/// One failed and one passed attempt on the first lesson.
fn example_attempts() -> Result<String> {
    let now = Utc::now();
    let attempts = vec![
        AttemptResult {
            lesson_id: LessonId(1),
            learner_id: LearnerId(1),
            percentage: 50,
            passed: false,
            timestamp: now - Duration::hours(1),
        },
        AttemptResult {
            lesson_id: LessonId(1),
            learner_id: LearnerId(1),
            percentage: 100,
            passed: true,
            timestamp: now,
        },
    ];
    Ok(serde_json::to_string_pretty(&attempts)?)
}

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = 1
title = "Workshop safety basics"
instructions = "Pick one answer per question."
pass_threshold = 70
max_attempts = 3
published = true
lesson_id = 1

[[questions]]
id = 1
statement = "What should you wear when using a grinder?"
order = 1

[[questions.alternatives]]
id = 1
text = "Safety glasses"
is_correct = true
order = 1

[[questions.alternatives]]
id = 2
text = "Sunglasses"
order = 2

[[questions]]
id = 2
statement = "Where is the emergency stop usually located?"
order = 2

[[questions.alternatives]]
id = 3
text = "Within reach of the operator"
is_correct = true
order = 1

[[questions.alternatives]]
id = 4
text = "In the supervisor's office"
order = 2
"#;

const EXAMPLE_COURSE: &str = r#"{
  "id": 1,
  "title": "Workshop onboarding",
  "modules": [
    {
      "id": 1,
      "course_id": 1,
      "title": "Safety",
      "order": 1,
      "lessons": [
        { "id": 1, "module_id": 1, "title": "Protective equipment", "order": 1, "quiz_id": 1 },
        { "id": 2, "module_id": 1, "title": "Emergency procedures", "order": 2, "quiz_id": 2 }
      ]
    },
    {
      "id": 2,
      "course_id": 1,
      "title": "Tools",
      "order": 2,
      "lessons": [
        { "id": 3, "module_id": 2, "title": "Hand tools", "order": 1 }
      ]
    }
  ]
}
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "1": 1,
  "2": 4
}
"#;
