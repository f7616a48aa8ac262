//! Adaptive question scheduling.
//!
//! - remediation queue: FIFO, filled on incorrect answers, drained first
//! - random draw: uniform over the pool, optionally avoiding repeats within a pass
//! - remediation pick: greedy max tag overlap, first in pool order wins ties
//!
//! All randomness comes from the caller's `Rng` so draws are reproducible in tests.

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::domain::Question;

#[derive(Clone, Debug, Default)]
pub struct AdaptiveScheduler {
  queue: VecDeque<Question>,
  /// Ids shown in the current pass (only maintained when exclusions are tracked).
  shown: HashSet<String>,
}

impl AdaptiveScheduler {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn queue_len(&self) -> usize {
    self.queue.len()
  }

  pub fn queued_ids(&self) -> Vec<&str> {
    self.queue.iter().map(|q| q.id.as_str()).collect()
  }

  pub fn shown_count(&self) -> usize {
    self.shown.len()
  }

  pub fn clear_queue(&mut self) {
    self.queue.clear();
  }

  pub fn clear_exclusions(&mut self) {
    self.shown.clear();
  }

  /// Mode change or full reset: nothing carries over.
  pub fn reset(&mut self) {
    self.clear_queue();
    self.clear_exclusions();
  }

  /// Next question to present, or `None` for an empty pool.
  pub fn next_question<R: Rng + ?Sized>(
    &mut self,
    pool: &[Question],
    adaptive: bool,
    track_exclusions: bool,
    rng: &mut R,
  ) -> Option<Question> {
    if adaptive {
      if let Some(q) = self.queue.pop_front() {
        debug!(target: "session", id = %q.id, remaining = self.queue.len(), "Serving remediation question");
        if track_exclusions {
          self.shown.insert(q.id.clone());
        }
        return Some(q);
      }
    }

    if pool.is_empty() {
      return None;
    }
    if !track_exclusions {
      return pool.choose(rng).cloned();
    }

    let mut fresh: Vec<&Question> = pool.iter().filter(|q| !self.shown.contains(&q.id)).collect();
    if fresh.is_empty() {
      debug!(target: "session", pool = pool.len(), "Every question shown; starting a new pass");
      self.shown.clear();
      fresh = pool.iter().collect();
    }
    let picked = fresh.choose(rng).map(|q| (*q).clone())?;
    self.shown.insert(picked.id.clone());
    Some(picked)
  }

  /// Queue the most similar pool entry after a miss. Returns the queued id,
  /// or `None` when adaptive mode is off, nothing overlaps, or the pick is
  /// already waiting in the queue.
  pub fn on_incorrect(&mut self, missed: &Question, pool: &[Question], adaptive: bool) -> Option<String> {
    if !adaptive {
      return None;
    }
    let pick = best_remediation(missed, pool)?;
    if self.queue.iter().any(|q| q.id == pick.id) {
      debug!(target: "session", id = %pick.id, "Remediation already queued");
      return None;
    }
    debug!(target: "session", missed = %missed.id, queued = %pick.id, "Queued remediation");
    self.queue.push_back(pick.clone());
    Some(pick.id.clone())
  }
}

/// Pool entry (other than `missed`) sharing the most tags with it.
/// Zero overlap means no remediation.
pub fn best_remediation<'a>(missed: &Question, pool: &'a [Question]) -> Option<&'a Question> {
  let mut best: Option<(&Question, usize)> = None;
  for candidate in pool.iter().filter(|q| q.id != missed.id) {
    let score = candidate.tag_overlap(missed);
    if score > best.map(|(_, s)| s).unwrap_or(0) {
      best = Some((candidate, score));
    }
  }
  best.map(|(q, _)| q)
}

/// Questions of the selected difficulty; `"all"` or no match yields the whole pool.
pub fn filter_by_difficulty<'a>(pool: &'a [Question], difficulty: &str) -> Cow<'a, [Question]> {
  let wanted = difficulty.trim().to_lowercase();
  if wanted.is_empty() || wanted == "all" {
    return Cow::Borrowed(pool);
  }
  let subset: Vec<Question> = pool
    .iter()
    .filter(|q| q.difficulty.eq_ignore_ascii_case(&wanted))
    .cloned()
    .collect();
  if subset.is_empty() {
    Cow::Borrowed(pool)
  } else {
    Cow::Owned(subset)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AnswerKey, ModuleId};
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use std::collections::{BTreeMap, BTreeSet};

  fn q(id: &str, tags: &[&str], difficulty: &str) -> Question {
    Question {
      id: id.into(),
      module: ModuleId::Naming,
      mode: "naming".into(),
      category: String::new(),
      prompt: id.into(),
      note: String::new(),
      rationale: String::new(),
      badge: String::new(),
      formula: None,
      geometry: None,
      coordination_number: None,
      central: None,
      ligands: vec![],
      ligand_sites: BTreeMap::new(),
      options: BTreeMap::new(),
      difficulty: difficulty.into(),
      tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
      answer: AnswerKey::FreeText { accepted: vec![id.into()] },
    }
  }

  #[test]
  fn remediation_picks_largest_overlap_first_wins_ties() {
    let missed = q("m", &["chloro", "octahedral"], "core");
    let pool = vec![
      missed.clone(),
      q("a", &["ammine"], "core"),
      q("b", &["chloro", "tetrahedral"], "core"),
      q("c", &["chloro", "octahedral", "ammine"], "core"),
      q("d", &["octahedral", "chloro"], "core"),
    ];
    let mut s = AdaptiveScheduler::new();
    assert_eq!(s.on_incorrect(&missed, &pool, true).as_deref(), Some("c"));
    assert_eq!(s.queued_ids(), vec!["c"]);

    // c and d tie at 2 and c came first; without c, d beats b.
    let pool2: Vec<Question> = pool.iter().filter(|x| x.id != "c").cloned().collect();
    assert_eq!(best_remediation(&missed, &pool2).map(|x| x.id.as_str()), Some("d"));
  }

  #[test]
  fn zero_overlap_enqueues_nothing() {
    let missed = q("m", &["chloro"], "core");
    let pool = vec![missed.clone(), q("a", &["aqua"], "core")];
    let mut s = AdaptiveScheduler::new();
    assert_eq!(s.on_incorrect(&missed, &pool, true), None);
    assert_eq!(s.queue_len(), 0);
  }

  #[test]
  fn never_remediates_with_the_missed_question() {
    let missed = q("m", &["chloro", "octahedral"], "core");
    let pool = vec![missed.clone()];
    let mut s = AdaptiveScheduler::new();
    assert_eq!(s.on_incorrect(&missed, &pool, true), None);
  }

  #[test]
  fn adaptive_off_is_noop_and_duplicates_are_not_requeued() {
    let missed = q("m", &["chloro"], "core");
    let pool = vec![missed.clone(), q("a", &["chloro"], "core")];
    let mut s = AdaptiveScheduler::new();
    assert_eq!(s.on_incorrect(&missed, &pool, false), None);
    assert_eq!(s.on_incorrect(&missed, &pool, true).as_deref(), Some("a"));
    assert_eq!(s.on_incorrect(&missed, &pool, true), None);
    assert_eq!(s.queue_len(), 1);
  }

  #[test]
  fn queue_is_served_before_random_draws() {
    let missed = q("m", &["x"], "core");
    let pool = vec![missed.clone(), q("a", &["x"], "core"), q("b", &["y"], "core")];
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = AdaptiveScheduler::new();
    s.on_incorrect(&missed, &pool, true);
    let next = s.next_question(&pool, true, false, &mut rng).unwrap();
    assert_eq!(next.id, "a");
    assert_eq!(s.queue_len(), 0);
  }

  #[test]
  fn queue_is_ignored_when_adaptive_off() {
    let missed = q("m", &["x"], "core");
    let pool = vec![missed.clone(), q("a", &["x"], "core")];
    let mut s = AdaptiveScheduler::new();
    s.on_incorrect(&missed, &pool, true);
    let mut rng = StdRng::seed_from_u64(1);
    s.next_question(&pool, false, false, &mut rng).unwrap();
    assert_eq!(s.queue_len(), 1);
  }

  #[test]
  fn exclusions_cover_a_full_pass_then_reset() {
    let pool: Vec<Question> = ["a", "b", "c", "d"].iter().map(|id| q(id, &[], "core")).collect();
    let mut rng = StdRng::seed_from_u64(42);
    let mut s = AdaptiveScheduler::new();
    let mut seen = HashSet::new();
    for _ in 0..4 {
      seen.insert(s.next_question(&pool, false, true, &mut rng).unwrap().id);
    }
    assert_eq!(seen.len(), 4);
    assert_eq!(s.shown_count(), 4);
    s.next_question(&pool, false, true, &mut rng).unwrap();
    assert_eq!(s.shown_count(), 1);
  }

  #[test]
  fn seeded_draws_are_reproducible() {
    let pool: Vec<Question> = (0..10).map(|i| q(&format!("q{i}"), &[], "core")).collect();
    let draw = |seed| {
      let mut rng = StdRng::seed_from_u64(seed);
      let mut s = AdaptiveScheduler::new();
      (0..6)
        .map(|_| s.next_question(&pool, true, true, &mut rng).unwrap().id)
        .collect::<Vec<_>>()
    };
    assert_eq!(draw(9), draw(9));
  }

  #[test]
  fn empty_pool_yields_none() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut s = AdaptiveScheduler::new();
    assert!(s.next_question(&[], true, true, &mut rng).is_none());
  }

  #[test]
  fn difficulty_filter_falls_back_to_full_pool() {
    let pool = vec![q("a", &[], "intro"), q("b", &[], "core"), q("c", &[], "core")];
    assert_eq!(filter_by_difficulty(&pool, "all").len(), 3);
    assert_eq!(filter_by_difficulty(&pool, "Core").len(), 2);
    assert_eq!(filter_by_difficulty(&pool, "advanced").len(), 3);
  }
}
