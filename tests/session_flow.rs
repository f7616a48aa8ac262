use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use ligand_trainer::config::QuestionCfg;
use ligand_trainer::content::ContentLibrary;
use ligand_trainer::diagram::DiagramView;
use ligand_trainer::domain::ModuleId;
use ligand_trainer::electrons::SpinSlot;
use ligand_trainer::geometry::GeometryRegistry;
use ligand_trainer::grader::Grade;
use ligand_trainer::mastery::MasteryTransition;
use ligand_trainer::session::{LearnerAnswer, Session, SessionEvent};
use ligand_trainer::settings::{load_settings, MemorySettingsStore, SettingsStore};

const NAMING_KEY: &str = "coordination-naming-settings";

fn naming(id: &str, answer: &str, tags: &[&str], difficulty: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Naming, "naming");
  q.id = Some(id.into());
  q.prompt = format!("Name {id}");
  q.accepted = vec![answer.into()];
  q.tags = tags.iter().map(|t| t.to_string()).collect();
  q.difficulty = Some(difficulty.into());
  q
}

fn builder(id: &str, d: u8, spin: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Bonding, "builder");
  q.id = Some(id.into());
  q.prompt = format!("Fill {id}");
  q.geometry = Some("octahedral".into());
  q.d_electrons = Some(d);
  q.spin = Some(spin.into());
  q
}

fn library(records: Vec<QuestionCfg>) -> Arc<ContentLibrary> {
  Arc::new(ContentLibrary::build(GeometryRegistry::standard(), records, Vec::new()))
}

fn open(module: ModuleId, lib: &Arc<ContentLibrary>, store: &Arc<MemorySettingsStore>) -> Session<StdRng> {
  let store: Arc<dyn SettingsStore> = store.clone();
  Session::open(module, Arc::clone(lib), store, StdRng::seed_from_u64(7))
}

fn text(value: &str) -> LearnerAnswer {
  LearnerAnswer::Text { value: value.into() }
}

fn graded(events: &[SessionEvent]) -> (&Grade, Option<&str>) {
  events
    .iter()
    .find_map(|e| match e {
      SessionEvent::Graded { grade, remediation, .. } => Some((grade, remediation.as_deref())),
      _ => None,
    })
    .expect("graded event")
}

fn current_id(s: &Session<StdRng>) -> String {
  s.current().expect("active question").id.clone()
}

fn place_all(s: &mut Session<StdRng>, slots: &[(&str, SpinSlot)]) {
  let tokens = s.board().expect("board").tokens().to_vec();
  for ((orbital, slot), token) in slots.iter().zip(tokens.iter()) {
    let events = s.place_electron(token, orbital, *slot);
    assert!(matches!(events[0], SessionEvent::BoardChanged { .. }), "{events:?}");
  }
}

#[test]
fn high_spin_d6_is_graded_correct_from_the_board() {
  let lib = library(vec![builder("fe-aq", 6, "high")]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Bonding, &lib, &store);

  let events = s.next_question();
  match &events[0] {
    SessionEvent::QuestionPresented { question, diagram } => {
      assert_eq!(question.tokens.len(), 6);
      assert!(matches!(diagram, Some(DiagramView::Orbital(_))));
    }
    other => panic!("unexpected {other:?}"),
  }

  place_all(
    &mut s,
    &[
      ("t2g1", SpinSlot::Up),
      ("t2g2", SpinSlot::Up),
      ("t2g3", SpinSlot::Up),
      ("eg1", SpinSlot::Up),
      ("eg2", SpinSlot::Up),
      ("t2g1", SpinSlot::Down),
    ],
  );
  let events = s.submit(LearnerAnswer::Orbital { spin: Some("high".into()) }).unwrap();
  let (grade, remediation) = graded(&events);
  assert!(grade.correct, "{grade:?}");
  assert_eq!(remediation, None);
  assert_eq!(s.score().correct, 1);
}

#[test]
fn high_spin_pattern_fails_a_low_spin_question() {
  let lib = library(vec![builder("co-nh3", 6, "low")]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Bonding, &lib, &store);
  s.next_question();

  place_all(
    &mut s,
    &[
      ("t2g1", SpinSlot::Up),
      ("t2g2", SpinSlot::Up),
      ("t2g3", SpinSlot::Up),
      ("eg1", SpinSlot::Up),
      ("eg2", SpinSlot::Up),
      ("t2g1", SpinSlot::Down),
    ],
  );
  let events = s.submit(LearnerAnswer::Orbital { spin: Some("low".into()) }).unwrap();
  let (grade, _) = graded(&events);
  assert!(!grade.correct);
  assert!(grade.expected.starts_with("low spin"));
  assert_eq!(s.score().streak, 0);
}

#[test]
fn occupied_slot_rejects_a_second_token() {
  let lib = library(vec![builder("mn", 5, "high")]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Bonding, &lib, &store);
  s.next_question();
  let tokens = s.board().unwrap().tokens().to_vec();

  s.place_electron(&tokens[0], "eg1", SpinSlot::Up);
  let events = s.place_electron(&tokens[1], "eg1", SpinSlot::Up);
  assert!(matches!(events[0], SessionEvent::PlacementRejected { .. }));
  assert_eq!(s.board().unwrap().occupant("eg1", SpinSlot::Up), Some(tokens[0].as_str()));
}

#[test]
fn miss_queues_the_closest_question_and_presents_it_next() {
  let lib = library(vec![
    naming("a", "alpha", &["ammine", "cobalt", "formula"], "core"),
    naming("b", "beta", &["chloro"], "core"),
    naming("c", "gamma", &["ammine", "cobalt"], "core"),
  ]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Naming, &lib, &store);

  // Walk until "a" is up, answering correctly along the way.
  s.next_question();
  for _ in 0..6 {
    if current_id(&s) == "a" {
      break;
    }
    let answer = match current_id(&s).as_str() {
      "b" => "beta",
      _ => "gamma",
    };
    s.submit(text(answer)).unwrap();
    s.next_question();
  }
  assert_eq!(current_id(&s), "a");

  let events = s.submit(text("wrong")).unwrap();
  let (grade, remediation) = graded(&events);
  assert!(!grade.correct);
  assert_eq!(remediation, Some("c"));
  assert_eq!(s.scheduler().queue_len(), 1);

  s.next_question();
  assert_eq!(current_id(&s), "c");
  assert_eq!(s.scheduler().queue_len(), 0);
}

#[test]
fn adaptive_off_queues_nothing() {
  let lib = library(vec![
    naming("a", "alpha", &["ammine"], "core"),
    naming("c", "gamma", &["ammine"], "core"),
  ]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Naming, &lib, &store);
  s.toggle_adaptive();
  assert!(!s.settings().adaptive);
  s.next_question();

  let events = s.submit(text("wrong")).unwrap();
  assert_eq!(graded(&events).1, None);
  assert_eq!(s.scheduler().queue_len(), 0);
}

#[test]
fn empty_answers_and_resubmits_are_ignored() {
  let lib = library(vec![naming("a", "alpha", &["x"], "core")]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Naming, &lib, &store);

  assert!(s.submit(text("alpha")).is_err());
  s.next_question();
  let events = s.submit(text("   ")).unwrap();
  assert!(matches!(events[0], SessionEvent::Ignored { .. }));
  assert_eq!(s.score().total, 0);

  s.submit(text("Alpha.")).unwrap();
  let events = s.submit(text("alpha")).unwrap();
  assert!(matches!(events[0], SessionEvent::Ignored { .. }));
  assert_eq!(s.score().total, 1);
}

#[test]
fn mastery_locks_labels_and_survives_reopen() {
  let lib = library(vec![naming("a", "alpha", &["x"], "core")]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Naming, &lib, &store);
  s.set_rigor(true);

  let mut locked_at = None;
  for i in 1..=12 {
    s.next_question();
    let events = s.submit(text("alpha")).unwrap();
    let locked = events.iter().any(|e| {
      matches!(
        e,
        SessionEvent::MasteryChanged { transition: MasteryTransition::Locked, scaffold_visible: false }
      )
    });
    if locked {
      locked_at = Some(i);
    }
  }
  assert_eq!(locked_at, Some(12));
  assert!(s.gate().is_locked());

  let saved = load_settings(&*store, NAMING_KEY);
  assert!(saved.labels_locked);
  assert!(!saved.show_labels);

  let mut reopened = open(ModuleId::Naming, &lib, &store);
  assert!(reopened.gate().is_locked());
  let events = reopened.toggle_scaffold();
  assert!(matches!(events[0], SessionEvent::Ignored { .. }));

  // A miss does not unlock; only turning rigor off does.
  reopened.next_question();
  reopened.submit(text("wrong")).unwrap();
  assert!(reopened.gate().is_locked());

  let events = reopened.set_rigor(false);
  assert!(events.iter().any(|e| matches!(
    e,
    SessionEvent::MasteryChanged { transition: MasteryTransition::Unlocked, scaffold_visible: true }
  )));
  assert!(!load_settings(&*store, NAMING_KEY).labels_locked);
}

#[test]
fn failing_store_keeps_in_memory_settings() {
  let lib = library(vec![naming("a", "alpha", &["x"], "core")]);
  let store: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::failing());
  let mut s = Session::open(ModuleId::Naming, lib, store, StdRng::seed_from_u64(1));

  let events = s.set_rigor(true);
  match &events[0] {
    SessionEvent::SettingsChanged { settings, persisted } => {
      assert!(!persisted);
      assert!(settings.rigor_mode);
    }
    other => panic!("unexpected {other:?}"),
  }
  assert!(s.settings().rigor_mode);
}

#[test]
fn malformed_settings_fall_back_to_defaults() {
  let lib = library(vec![naming("a", "alpha", &["x"], "core")]);
  let store = Arc::new(MemorySettingsStore::new().with_entry(NAMING_KEY, "{not json"));
  let s = open(ModuleId::Naming, &lib, &store);
  assert!(s.settings().adaptive);
  assert!(!s.settings().rigor_mode);
  assert_eq!(store.read(NAMING_KEY).unwrap(), None);
}

#[test]
fn difficulty_filter_restricts_draws() {
  let lib = library(vec![
    naming("easy", "alpha", &["x"], "intro"),
    naming("hard", "beta", &["y"], "advanced"),
  ]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Naming, &lib, &store);

  let events = s.set_difficulty("advanced");
  assert!(matches!(events[0], SessionEvent::SettingsChanged { persisted: true, .. }));
  for _ in 0..5 {
    assert_eq!(current_id(&s), "hard");
    s.next_question();
  }
  assert_eq!(load_settings(&*store, NAMING_KEY).difficulty, "advanced");
}

#[test]
fn orbital_answer_without_spin_is_ignored() {
  let lib = library(vec![builder("hs", 6, "high"), builder("ls", 6, "low")]);
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Bonding, &lib, &store);
  s.next_question();

  for spin in [None, Some("medium".to_string())] {
    let events = s.submit(LearnerAnswer::Orbital { spin }).unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SessionEvent::Ignored { .. }), "{events:?}");
  }
  assert_eq!(s.score().total, 0);
  assert_eq!(s.scheduler().queue_len(), 0);

  let events = s.submit(LearnerAnswer::Orbital { spin: Some("high".into()) }).unwrap();
  graded(&events);
  assert_eq!(s.score().total, 1);
}

#[test]
fn skip_without_a_question_is_ignored() {
  let lib = library(Vec::new());
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Naming, &lib, &store);
  s.next_question();

  let events = s.skip();
  assert_eq!(events.len(), 1);
  assert!(matches!(events[0], SessionEvent::Ignored { .. }));
  assert_eq!(s.score().total, 0);
  assert_eq!(s.score().streak, 0);
}

#[test]
fn empty_pool_is_reported() {
  let lib = library(Vec::new());
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Isomerism, &lib, &store);
  let events = s.next_question();
  assert!(matches!(events[0], SessionEvent::PoolEmpty { module: ModuleId::Isomerism, .. }));
  assert!(s.current().is_none());
}

#[test]
fn unknown_mode_is_an_error() {
  let lib = library(Vec::new());
  let store = Arc::new(MemorySettingsStore::new());
  let mut s = open(ModuleId::Bonding, &lib, &store);
  assert!(s.set_mode("spectra").is_ok());
  assert_eq!(s.mode(), "spectra");
  assert!(s.set_mode("crystal").is_err());
}
