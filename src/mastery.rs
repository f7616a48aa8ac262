//! Mastery gate: a sticky per-module latch that withdraws a visual scaffold
//! (atom/orbital labels) once sustained performance is shown under rigor mode.
//!
//! `Unlocked -> Locked` only while rigor mode is on and the policy is met.
//! `Locked -> Unlocked` only when the learner turns rigor mode off.
//! While locked, scaffold toggles are rejected.

use serde::{Deserialize, Serialize};

use crate::score::ScoreState;

/// Thresholds for locking the scaffold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasteryPolicy {
    pub streak: u32,
    pub min_attempts: u32,
    pub min_accuracy: f64,
}

impl MasteryPolicy {
    pub fn new(streak: u32, min_attempts: u32) -> Self {
        Self {
            streak,
            min_attempts,
            min_accuracy: 0.8,
        }
    }

    pub fn is_met(&self, score: &ScoreState) -> bool {
        score.streak >= self.streak
            && score.total >= self.min_attempts
            && score.accuracy() >= self.min_accuracy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    Locked,
}

/// A state change of the gate, reported to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTransition {
    /// Threshold crossed; scaffold hidden.
    Locked,
    /// Rigor mode turned off; scaffold shown again.
    Unlocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScaffoldToggle {
    Changed(bool),
    RejectedLocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MasteryGate {
    policy: MasteryPolicy,
    rigor: bool,
    lock: LockState,
    scaffold_visible: bool,
}

impl MasteryGate {
    pub fn new(policy: MasteryPolicy) -> Self {
        Self {
            policy,
            rigor: false,
            lock: LockState::Unlocked,
            scaffold_visible: true,
        }
    }

    /// Rebuild from a persisted snapshot. A lock without rigor mode cannot
    /// exist, and a locked gate always hides the scaffold.
    pub fn restore(policy: MasteryPolicy, rigor: bool, locked: bool, scaffold_visible: bool) -> Self {
        let locked = locked && rigor;
        Self {
            policy,
            rigor,
            lock: if locked { LockState::Locked } else { LockState::Unlocked },
            scaffold_visible: scaffold_visible && !locked,
        }
    }

    pub fn policy(&self) -> MasteryPolicy {
        self.policy
    }

    pub fn rigor(&self) -> bool {
        self.rigor
    }

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    pub fn is_locked(&self) -> bool {
        self.lock == LockState::Locked
    }

    pub fn scaffold_visible(&self) -> bool {
        self.scaffold_visible
    }

    /// Lock if rigor mode is on and the score meets the policy.
    pub fn evaluate(&mut self, score: &ScoreState) -> Option<MasteryTransition> {
        if !self.rigor || self.is_locked() || !self.policy.is_met(score) {
            return None;
        }
        self.lock = LockState::Locked;
        self.scaffold_visible = false;
        Some(MasteryTransition::Locked)
    }

    /// Enabling rigor re-checks the threshold immediately; disabling it is the
    /// only way to unlock.
    pub fn set_rigor(&mut self, enabled: bool, score: &ScoreState) -> Option<MasteryTransition> {
        if enabled == self.rigor {
            return None;
        }
        self.rigor = enabled;
        if enabled {
            return self.evaluate(score);
        }
        let was_locked = self.is_locked();
        self.lock = LockState::Unlocked;
        self.scaffold_visible = true;
        was_locked.then_some(MasteryTransition::Unlocked)
    }

    pub fn toggle_scaffold(&mut self) -> ScaffoldToggle {
        if self.is_locked() {
            return ScaffoldToggle::RejectedLocked;
        }
        self.scaffold_visible = !self.scaffold_visible;
        ScaffoldToggle::Changed(self.scaffold_visible)
    }
}
