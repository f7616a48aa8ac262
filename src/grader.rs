//! Answer grading: one entry point that dispatches on the question's answer
//! key. Grading is pure; it never touches the question or occupancy data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AnswerKey, Question};
use crate::electrons::{fill_orbitals, ligand_field_stabilization, Occupancy, SpinState};
use crate::error::CoreError;
use crate::geometry::GeometryRegistry;
use crate::util::normalize_answer;

/// A learner's answer in graded form.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
  Text(String),
  Selections(BTreeMap<String, String>),
  Ordering(Vec<String>),
  Orbital {
    actual: Occupancy,
    declared: Option<SpinState>,
  },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grade {
  pub correct: bool,
  /// The canonical answer, human readable.
  pub expected: String,
  /// Feedback line shown after grading.
  pub explanation: String,
}

impl Grade {
  fn new(correct: bool, expected: String, question: &Question) -> Self {
    let head = if correct {
      "Correct.".to_string()
    } else {
      format!("Expected: {expected}.")
    };
    let explanation = if question.rationale.is_empty() {
      head
    } else {
      format!("{head} {}", question.rationale)
    };
    Self { correct, expected, explanation }
  }
}

/// Grade `submission` against `question`. Fails only when an orbital-filling
/// question names a geometry without a registered model.
pub fn grade(
  question: &Question,
  submission: &Submission,
  registry: &GeometryRegistry,
) -> Result<Grade, CoreError> {
  match (&question.answer, submission) {
    (AnswerKey::FreeText { accepted }, Submission::Text(answer)) => {
      Ok(grade_text(question, accepted, answer))
    }
    (AnswerKey::Selection { fields }, Submission::Selections(chosen)) => {
      Ok(grade_selection(question, fields, chosen))
    }
    (AnswerKey::Ordering { sequence }, Submission::Ordering(order)) => {
      let correct = sequence == order;
      Ok(Grade::new(correct, sequence.join(" > "), question))
    }
    (AnswerKey::Orbital { d_electrons, spin }, Submission::Orbital { actual, declared }) => {
      let geometry = question.geometry.as_deref().unwrap_or_default();
      let cfg = registry.get(geometry)?;
      let expected = fill_orbitals(cfg, *d_electrons, *spin);
      let correct = actual.matches(&expected, cfg) && *declared == Some(*spin);
      let stab = ligand_field_stabilization(&expected, cfg);
      let expected_text = format!(
        "{} spin with correct orbital filling (CFSE {:.2} Δ, {} paired)",
        spin.as_str(),
        stab.energy,
        stab.paired_orbital_count
      );
      Ok(Grade::new(correct, expected_text, question))
    }
    (key, _) => Ok(Grade {
      correct: false,
      expected: expected_display(key),
      explanation: "Answer format does not match this question.".into(),
    }),
  }
}

fn grade_text(question: &Question, accepted: &[String], answer: &str) -> Grade {
  let given = normalize_answer(answer);
  let correct = !given.is_empty() && accepted.iter().any(|a| normalize_answer(a) == given);
  let expected = accepted.first().cloned().unwrap_or_default();
  Grade::new(correct, expected, question)
}

fn grade_selection(
  question: &Question,
  fields: &BTreeMap<String, String>,
  chosen: &BTreeMap<String, String>,
) -> Grade {
  let correct = fields.iter().all(|(field, want)| {
    chosen
      .get(field)
      .map(|got| normalize_answer(got) == normalize_answer(want))
      .unwrap_or(false)
  });
  Grade::new(correct, selection_display(fields), question)
}

fn selection_display(fields: &BTreeMap<String, String>) -> String {
  fields
    .iter()
    .map(|(k, v)| format!("{k} {v}"))
    .collect::<Vec<_>>()
    .join(", ")
}

fn expected_display(key: &AnswerKey) -> String {
  match key {
    AnswerKey::FreeText { accepted } => accepted.first().cloned().unwrap_or_default(),
    AnswerKey::Selection { fields } => selection_display(fields),
    AnswerKey::Ordering { sequence } => sequence.join(" > "),
    AnswerKey::Orbital { spin, .. } => format!("{} spin", spin.as_str()),
  }
}
