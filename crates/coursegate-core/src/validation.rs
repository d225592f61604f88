//! Quiz authoring validation.
//!
//! Checks a quiz draft for structural soundness before it is persisted and
//! reports every defect in one pass. The only change ever applied to an
//! accepted draft is re-indexing questions and alternatives by declared order.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{ValidationIssue, ValidationReason};
use crate::model::{Alternative, Question, Quiz};
use crate::sequencing::compare_order;

/// When validation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStage {
    /// Saving work in progress: an empty question list is tolerated.
    Draft,
    /// Publishing to learners: at least one question is required.
    #[default]
    Finalize,
}

/// Validate a quiz draft, returning the normalized quiz or every issue found.
pub fn validate_quiz_draft(
    draft: &Quiz,
    stage: ValidationStage,
) -> Result<Quiz, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if draft.title.trim().is_empty() {
        issues.push(quiz_issue(ValidationReason::EmptyTitle));
    }

    if !draft.pass_threshold.is_finite() || !(0.0..=100.0).contains(&draft.pass_threshold) {
        issues.push(quiz_issue(ValidationReason::PassThresholdOutOfRange));
    }

    if stage == ValidationStage::Finalize && draft.questions.is_empty() {
        issues.push(quiz_issue(ValidationReason::NoQuestions));
    }

    let mut seen_question_ids = HashSet::new();
    for (index, question) in draft.questions.iter().enumerate() {
        if let Some(id) = question.id {
            if !seen_question_ids.insert(id) {
                issues.push(ValidationIssue {
                    question_index: Some(index),
                    reason: ValidationReason::DuplicateQuestionId { id: id.value() },
                });
            }
        }

        issues.extend(
            check_question(question)
                .into_iter()
                .map(|reason| ValidationIssue {
                    question_index: Some(index),
                    reason,
                }),
        );
    }

    if !issues.is_empty() {
        tracing::debug!(
            title = %draft.title,
            issues = issues.len(),
            "quiz draft rejected"
        );
        return Err(issues);
    }

    Ok(normalize(draft))
}

fn quiz_issue(reason: ValidationReason) -> ValidationIssue {
    ValidationIssue {
        question_index: None,
        reason,
    }
}

fn check_question(question: &Question) -> Vec<ValidationReason> {
    let mut reasons = Vec::new();

    if question.statement.trim().is_empty() {
        reasons.push(ValidationReason::EmptyStatement);
    }

    if !question.weight.is_finite() || question.weight <= 0.0 {
        reasons.push(ValidationReason::InvalidWeight);
    }

    if !question
        .alternatives
        .iter()
        .any(|a| !a.text.trim().is_empty())
    {
        reasons.push(ValidationReason::NoAlternativeText);
    }

    // Never pick a winner among several correct flags, and never promote one.
    match question.correct_alternatives().count() {
        0 => reasons.push(ValidationReason::NoCorrectAlternative),
        1 => {}
        count => reasons.push(ValidationReason::MultipleCorrectAlternatives { count }),
    }

    let mut seen = HashSet::new();
    for alt in &question.alternatives {
        if let Some(id) = alt.id {
            if !seen.insert(id) {
                reasons.push(ValidationReason::DuplicateAlternativeId { id: id.value() });
            }
        }
    }

    reasons
}

/// Re-index questions and their alternatives by declared order.
///
/// Ties fall back to the position in the draft, then to the numeric id.
/// After sorting, `order` is rewritten to 1..=n.
fn normalize(draft: &Quiz) -> Quiz {
    let mut quiz = draft.clone();

    quiz.questions = reindex(&draft.questions, |q| q.order, |q| q.id.map(|id| id.value()))
        .into_iter()
        .enumerate()
        .map(|(pos, mut q)| {
            q.order = Some(pos as i64 + 1);
            q.alternatives = reindex(&q.alternatives, |a| a.order, |a| a.id.map(|id| id.value()))
                .into_iter()
                .enumerate()
                .map(|(alt_pos, mut a): (usize, Alternative)| {
                    a.order = Some(alt_pos as i64 + 1);
                    a
                })
                .collect();
            q
        })
        .collect();

    quiz
}

fn reindex<T: Clone>(
    items: &[T],
    order: impl Fn(&T) -> Option<i64>,
    id: impl Fn(&T) -> Option<u64>,
) -> Vec<T> {
    let mut indexed: Vec<(usize, &T)> = items.iter().enumerate().collect();
    indexed.sort_by(|(pa, a), (pb, b)| {
        compare_order(order(a), order(b))
            .then_with(|| pa.cmp(pb))
            .then_with(|| compare_ids(id(a), id(b)))
    });
    indexed.into_iter().map(|(_, item)| item.clone()).collect()
}

fn compare_ids(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
