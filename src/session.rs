//! Session context: the single value that owns one learner's state inside one
//! module, and the only place state transitions happen.
//!
//! Every operation returns the list of `SessionEvent`s describing what changed;
//! the transport layer forwards them and the renderer decides how to show them.
//! Settings-affecting operations write through to the settings store.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::content::ContentLibrary;
use crate::diagram::{orbital_diagram, structure_model, DiagramView};
use crate::domain::{AnswerKind, ModuleId, ModuleProfile, Question};
use crate::electrons::{ElectronBoard, PlaceOutcome, PlacementRejection, SpinSlot, SpinState};
use crate::error::CoreError;
use crate::grader::{grade, Grade, Submission};
use crate::mastery::{MasteryGate, MasteryTransition, ScaffoldToggle};
use crate::scheduler::{filter_by_difficulty, AdaptiveScheduler};
use crate::score::ScoreState;
use crate::settings::{load_settings, save_settings, ModuleSettings, SettingsStore};
use crate::util::trunc_for_log;

/// What the learner sends on submit. Orbital answers take the occupancy from
/// the session's electron board; ordering answers default to the working order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LearnerAnswer {
    Text {
        value: String,
    },
    Selections {
        values: BTreeMap<String, String>,
    },
    Ordering {
        #[serde(default)]
        sequence: Option<Vec<String>>,
    },
    Orbital {
        #[serde(default)]
        spin: Option<String>,
    },
}

/// Question as shown to the learner: no answer key.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub module: ModuleId,
    pub mode: String,
    pub kind: AnswerKind,
    pub category: String,
    pub prompt: String,
    pub note: String,
    pub badge: String,
    pub formula: Option<String>,
    pub geometry: Option<String>,
    pub difficulty: String,
    pub options: BTreeMap<String, Vec<String>>,
    /// Ordering tasks: the current working order.
    pub items: Vec<String>,
    /// Orbital tasks: electron token ids.
    pub tokens: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    QuestionPresented {
        question: QuestionView,
        diagram: Option<DiagramView>,
    },
    PoolEmpty {
        module: ModuleId,
        mode: String,
    },
    Graded {
        question_id: String,
        grade: Grade,
        /// Id of the question queued for remediation, if any.
        remediation: Option<String>,
    },
    BoardChanged {
        diagram: Option<DiagramView>,
    },
    PlacementRejected {
        token: String,
        reason: PlacementRejection,
    },
    OrderChanged {
        items: Vec<String>,
    },
    SettingsChanged {
        settings: ModuleSettings,
        persisted: bool,
    },
    MasteryChanged {
        transition: MasteryTransition,
        scaffold_visible: bool,
    },
    ScoreChanged {
        score: ScoreState,
        percent: u32,
    },
    Ignored {
        reason: String,
    },
}

impl SessionEvent {
    fn ignored(reason: &str) -> Self {
        SessionEvent::Ignored {
            reason: reason.to_string(),
        }
    }
}

pub struct Session<R: Rng = StdRng> {
    module: ModuleId,
    profile: ModuleProfile,
    mode: String,
    library: Arc<ContentLibrary>,
    store: Arc<dyn SettingsStore>,
    settings: ModuleSettings,
    gate: MasteryGate,
    scheduler: AdaptiveScheduler,
    score: ScoreState,
    current: Option<Question>,
    board: Option<ElectronBoard>,
    order: Vec<String>,
    answered: bool,
    rng: R,
}

impl<R: Rng> Session<R> {
    /// Load the module's persisted settings (merged over defaults) and restore
    /// the mastery gate. No question is presented until `next_question`.
    #[instrument(level = "info", skip_all, fields(%module))]
    pub fn open(module: ModuleId, library: Arc<ContentLibrary>, store: Arc<dyn SettingsStore>, rng: R) -> Self {
        let profile = module.profile();
        let mut settings = load_settings(store.as_ref(), profile.settings_key);
        let gate = MasteryGate::restore(
            profile.mastery,
            settings.rigor_mode,
            settings.labels_locked,
            settings.show_labels,
        );
        settings.labels_locked = gate.is_locked();
        settings.show_labels = gate.scaffold_visible();
        if !profile.difficulty_filter {
            settings.difficulty = "all".into();
        }
        info!(
            target: "session",
            %module,
            adaptive = settings.adaptive,
            rigor = settings.rigor_mode,
            locked = settings.labels_locked,
            "Session opened"
        );
        Self {
            module,
            profile,
            mode: profile.default_mode().to_string(),
            library,
            store,
            settings,
            gate,
            scheduler: AdaptiveScheduler::new(),
            score: ScoreState::default(),
            current: None,
            board: None,
            order: Vec::new(),
            answered: false,
            rng,
        }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn settings(&self) -> &ModuleSettings {
        &self.settings
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    pub fn gate(&self) -> &MasteryGate {
        &self.gate
    }

    pub fn scheduler(&self) -> &AdaptiveScheduler {
        &self.scheduler
    }

    pub fn current(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    pub fn board(&self) -> Option<&ElectronBoard> {
        self.board.as_ref()
    }

    pub fn working_order(&self) -> &[String] {
        &self.order
    }

    /// Present the next question: remediation first, then a random draw.
    #[instrument(level = "debug", skip(self), fields(module = %self.module, mode = %self.mode))]
    pub fn next_question(&mut self) -> Vec<SessionEvent> {
        let library = Arc::clone(&self.library);
        let picked = match library.require_pool(self.module, &self.mode) {
            Ok(full) => {
                let pool = self.active_pool(full);
                self.scheduler.next_question(
                    &pool,
                    self.settings.adaptive,
                    self.profile.tracks_exclusions,
                    &mut self.rng,
                )
            }
            Err(e) => {
                warn!(target: "session", error = %e, "No questions available");
                None
            }
        };

        let Some(question) = picked else {
            self.clear_current();
            return vec![SessionEvent::PoolEmpty {
                module: self.module,
                mode: self.mode.clone(),
            }];
        };
        self.present(question)
    }

    /// Switch mode. Queue and exclusions do not carry over.
    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn set_mode(&mut self, mode: &str) -> Result<Vec<SessionEvent>, CoreError> {
        let spec = self.profile.mode(mode.trim())?;
        if spec.key == self.mode {
            return Ok(vec![SessionEvent::ignored("mode unchanged")]);
        }
        self.mode = spec.key.to_string();
        self.scheduler.reset();
        Ok(self.next_question())
    }

    /// Restrict draws to one difficulty (`all` for every question).
    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn set_difficulty(&mut self, difficulty: &str) -> Vec<SessionEvent> {
        if !self.profile.difficulty_filter {
            return vec![SessionEvent::ignored("module has no difficulty filter")];
        }
        let difficulty = difficulty.trim().to_lowercase();
        let difficulty = if difficulty.is_empty() { "all".to_string() } else { difficulty };
        if difficulty == self.settings.difficulty {
            return vec![SessionEvent::ignored("difficulty unchanged")];
        }
        self.settings.difficulty = difficulty;
        self.scheduler.reset();
        let mut events = vec![self.persist()];
        events.extend(self.next_question());
        events
    }

    #[instrument(level = "debug", skip(self))]
    pub fn place_electron(&mut self, token: &str, orbital: &str, slot: SpinSlot) -> Vec<SessionEvent> {
        if self.answered {
            return vec![SessionEvent::ignored("question already graded")];
        }
        let library = Arc::clone(&self.library);
        let Some(board) = self.board.as_mut() else {
            return vec![SessionEvent::ignored("no orbital board")];
        };
        let Ok(cfg) = library.registry().get(board.geometry()) else {
            return vec![SessionEvent::ignored("no crystal-field model")];
        };
        match board.place(cfg, token, orbital, slot) {
            PlaceOutcome::Placed => vec![SessionEvent::BoardChanged {
                diagram: self.diagram(),
            }],
            PlaceOutcome::Unchanged => vec![SessionEvent::ignored("token already in that slot")],
            PlaceOutcome::Rejected(reason) => {
                debug!(target: "session", %token, %orbital, ?slot, ?reason, "Placement rejected");
                vec![SessionEvent::PlacementRejected {
                    token: token.to_string(),
                    reason,
                }]
            }
        }
    }

    /// Return a token to the holding area.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_electron(&mut self, token: &str) -> Vec<SessionEvent> {
        if self.answered {
            return vec![SessionEvent::ignored("question already graded")];
        }
        let removed = self.board.as_mut().map(|b| b.remove(token)).unwrap_or(false);
        if removed {
            vec![SessionEvent::BoardChanged {
                diagram: self.diagram(),
            }]
        } else {
            vec![SessionEvent::ignored("token not placed")]
        }
    }

    /// Swap the item at `index` with the one before it.
    #[instrument(level = "debug", skip(self))]
    pub fn move_in_order(&mut self, index: usize) -> Vec<SessionEvent> {
        if self.answered || index == 0 || index >= self.order.len() {
            return vec![SessionEvent::ignored("item cannot move up")];
        }
        self.order.swap(index - 1, index);
        vec![SessionEvent::OrderChanged {
            items: self.order.clone(),
        }]
    }

    /// Grade the current question, update score and mastery, queue remediation
    /// on a miss. Empty text answers and orbital answers without a spin state
    /// are ignored rather than graded.
    #[instrument(level = "info", skip(self, answer), fields(module = %self.module, mode = %self.mode))]
    pub fn submit(&mut self, answer: LearnerAnswer) -> Result<Vec<SessionEvent>, CoreError> {
        let question = self.current.clone().ok_or(CoreError::NoActiveQuestion)?;
        if self.answered {
            return Ok(vec![SessionEvent::ignored("question already graded")]);
        }
        if let LearnerAnswer::Text { value } = &answer {
            if value.trim().is_empty() {
                return Ok(vec![SessionEvent::ignored("empty answer")]);
            }
            debug!(target: "session", id = %question.id, answer = %trunc_for_log(value, 80), "Text answer");
        }
        if let LearnerAnswer::Orbital { spin } = &answer {
            if spin.as_deref().and_then(SpinState::parse).is_none() {
                return Ok(vec![SessionEvent::ignored("no spin state selected")]);
            }
        }

        let submission = self.submission(answer)?;
        let result = grade(&question, &submission, self.library.registry())?;
        self.answered = true;
        self.score.record(result.correct);

        let remediation = if result.correct {
            None
        } else {
            let library = Arc::clone(&self.library);
            let pool = self.active_pool(library.pool(self.module, &self.mode));
            self.scheduler.on_incorrect(&question, &pool, self.settings.adaptive)
        };
        info!(
            target: "session",
            id = %question.id,
            correct = result.correct,
            streak = self.score.streak,
            total = self.score.total,
            remediation = remediation.as_deref().unwrap_or("-"),
            "Graded answer"
        );

        let mut events = vec![
            SessionEvent::Graded {
                question_id: question.id.clone(),
                grade: result,
                remediation,
            },
            self.score_event(),
        ];
        events.extend(self.evaluate_mastery());
        Ok(events)
    }

    /// Counts as an attempt, breaks the streak and moves on.
    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn skip(&mut self) -> Vec<SessionEvent> {
        if self.current.is_none() {
            return vec![SessionEvent::ignored("no active question")];
        }
        self.score.skip();
        let mut events = vec![self.score_event()];
        events.extend(self.evaluate_mastery());
        events.extend(self.next_question());
        events
    }

    /// Zero the score, forget exclusions and the queue, present a question.
    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        self.score.reset();
        self.scheduler.reset();
        let mut events = vec![self.score_event()];
        events.extend(self.next_question());
        events
    }

    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn toggle_adaptive(&mut self) -> Vec<SessionEvent> {
        self.settings.adaptive = !self.settings.adaptive;
        if !self.settings.adaptive {
            self.scheduler.clear_queue();
        }
        vec![self.persist()]
    }

    /// Enabling re-checks mastery at once; disabling is the only unlock.
    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn set_rigor(&mut self, enabled: bool) -> Vec<SessionEvent> {
        if enabled == self.settings.rigor_mode {
            return vec![SessionEvent::ignored("rigor mode unchanged")];
        }
        let transition = self.gate.set_rigor(enabled, &self.score);
        self.settings.rigor_mode = enabled;
        self.sync_gate_settings();
        let mut events = vec![self.persist()];
        if let Some(transition) = transition {
            events.push(self.mastery_event(transition));
            events.push(SessionEvent::BoardChanged {
                diagram: self.diagram(),
            });
        }
        events
    }

    /// Show or hide labels; rejected while the mastery lock holds.
    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn toggle_scaffold(&mut self) -> Vec<SessionEvent> {
        match self.gate.toggle_scaffold() {
            ScaffoldToggle::RejectedLocked => vec![SessionEvent::ignored("labels locked by mastery")],
            ScaffoldToggle::Changed(_) => {
                self.sync_gate_settings();
                vec![
                    self.persist(),
                    SessionEvent::BoardChanged {
                        diagram: self.diagram(),
                    },
                ]
            }
        }
    }

    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn cycle_color_mode(&mut self) -> Vec<SessionEvent> {
        self.settings.color_mode = self.settings.color_mode.cycle();
        vec![
            self.persist(),
            SessionEvent::BoardChanged {
                diagram: self.diagram(),
            },
        ]
    }

    #[instrument(level = "info", skip(self), fields(module = %self.module))]
    pub fn toggle_overlap(&mut self) -> Vec<SessionEvent> {
        self.settings.show_overlap = !self.settings.show_overlap;
        vec![
            self.persist(),
            SessionEvent::BoardChanged {
                diagram: self.diagram(),
            },
        ]
    }

    /// Diagram data for the current question, if it has one.
    pub fn diagram(&self) -> Option<DiagramView> {
        let question = self.current.as_ref()?;
        let scaffold = self.gate.scaffold_visible();
        if let Some(board) = &self.board {
            return Some(match self.library.registry().get(board.geometry()) {
                Ok(cfg) => DiagramView::Orbital(orbital_diagram(board, cfg, scaffold, self.settings.show_overlap)),
                Err(_) => DiagramView::unavailable(board.geometry()),
            });
        }
        let geometry = question.geometry.as_deref()?;
        Some(match structure_model(question, self.settings.color_mode, scaffold) {
            Ok(model) => DiagramView::Structure(model),
            Err(_) => DiagramView::unavailable(geometry),
        })
    }

    pub fn question_view(&self) -> Option<QuestionView> {
        let q = self.current.as_ref()?;
        Some(QuestionView {
            id: q.id.clone(),
            module: q.module,
            mode: q.mode.clone(),
            kind: q.kind(),
            category: q.category.clone(),
            prompt: q.prompt.clone(),
            note: q.note.clone(),
            badge: q.badge.clone(),
            formula: q.formula.clone(),
            geometry: q.geometry.clone(),
            difficulty: q.difficulty.clone(),
            options: q.options.clone(),
            items: self.order.clone(),
            tokens: self
                .board
                .as_ref()
                .map(|b| b.tokens().to_vec())
                .unwrap_or_default(),
        })
    }

    fn active_pool<'a>(&self, pool: &'a [Question]) -> Cow<'a, [Question]> {
        if self.profile.difficulty_filter {
            filter_by_difficulty(pool, &self.settings.difficulty)
        } else {
            Cow::Borrowed(pool)
        }
    }

    fn present(&mut self, question: Question) -> Vec<SessionEvent> {
        self.board = match (&question.geometry, question.d_electrons()) {
            (Some(geometry), Some(d)) => Some(ElectronBoard::new(&question.id, geometry, d)),
            _ => None,
        };
        self.order = if question.kind() == AnswerKind::Ordering {
            let mut items = question.ligands.clone();
            items.shuffle(&mut self.rng);
            items
        } else {
            Vec::new()
        };
        self.answered = false;
        debug!(target: "session", id = %question.id, difficulty = %question.difficulty, "Presenting question");
        self.current = Some(question);

        let Some(view) = self.question_view() else {
            return Vec::new();
        };
        vec![SessionEvent::QuestionPresented {
            question: view,
            diagram: self.diagram(),
        }]
    }

    fn clear_current(&mut self) {
        self.current = None;
        self.board = None;
        self.order.clear();
        self.answered = false;
    }

    fn submission(&self, answer: LearnerAnswer) -> Result<Submission, CoreError> {
        Ok(match answer {
            LearnerAnswer::Text { value } => Submission::Text(value),
            LearnerAnswer::Selections { values } => Submission::Selections(values),
            LearnerAnswer::Ordering { sequence } => Submission::Ordering(sequence.unwrap_or_else(|| self.order.clone())),
            LearnerAnswer::Orbital { spin } => {
                let declared = spin.as_deref().and_then(SpinState::parse);
                let actual = match &self.board {
                    Some(board) => board.actual_occupancy(self.library.registry().get(board.geometry())?),
                    None => Default::default(),
                };
                Submission::Orbital { actual, declared }
            }
        })
    }

    fn evaluate_mastery(&mut self) -> Vec<SessionEvent> {
        let Some(transition) = self.gate.evaluate(&self.score) else {
            return Vec::new();
        };
        info!(target: "session", module = %self.module, score = ?self.score, "Mastery reached; labels locked");
        self.sync_gate_settings();
        vec![
            self.persist(),
            self.mastery_event(transition),
            SessionEvent::BoardChanged {
                diagram: self.diagram(),
            },
        ]
    }

    fn sync_gate_settings(&mut self) {
        self.settings.labels_locked = self.gate.is_locked();
        self.settings.show_labels = self.gate.scaffold_visible();
    }

    fn persist(&self) -> SessionEvent {
        let persisted = save_settings(self.store.as_ref(), self.profile.settings_key, &self.settings);
        SessionEvent::SettingsChanged {
            settings: self.settings.clone(),
            persisted,
        }
    }

    fn mastery_event(&self, transition: MasteryTransition) -> SessionEvent {
        SessionEvent::MasteryChanged {
            transition,
            scaffold_visible: self.gate.scaffold_visible(),
        }
    }

    fn score_event(&self) -> SessionEvent {
        SessionEvent::ScoreChanged {
            score: self.score,
            percent: self.score.percent(),
        }
    }
}
