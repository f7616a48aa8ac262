//! Domain models: practice modules, their modes, and question records.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::electrons::SpinState;
use crate::error::CoreError;
use crate::mastery::MasteryPolicy;

/// Which practice module a question or session belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleId {
  /// Coordination-compound nomenclature (free-text names).
  Naming,
  /// Coordination number and geometry recognition.
  Coordination,
  /// Ligand-field theory: orbital filling, spectrochemical series, MO levels.
  Bonding,
  /// Geometric, optical and structural isomerism.
  Isomerism,
  /// Substitution kinetics: mechanism from rate laws, pathways, stereochemistry.
  Reactions,
  /// Unit cells, atom counts, packing efficiency and lattice systems.
  Solids,
}

impl ModuleId {
  pub const ALL: [ModuleId; 6] = [
    ModuleId::Naming,
    ModuleId::Coordination,
    ModuleId::Bonding,
    ModuleId::Isomerism,
    ModuleId::Reactions,
    ModuleId::Solids,
  ];

  pub fn parse(s: &str) -> Result<Self, CoreError> {
    match s.trim().to_lowercase().as_str() {
      "naming" => Ok(ModuleId::Naming),
      "coordination" => Ok(ModuleId::Coordination),
      "bonding" => Ok(ModuleId::Bonding),
      "isomerism" => Ok(ModuleId::Isomerism),
      "reactions" => Ok(ModuleId::Reactions),
      "solids" => Ok(ModuleId::Solids),
      other => Err(CoreError::UnknownModule(other.to_string())),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ModuleId::Naming => "naming",
      ModuleId::Coordination => "coordination",
      ModuleId::Bonding => "bonding",
      ModuleId::Isomerism => "isomerism",
      ModuleId::Reactions => "reactions",
      ModuleId::Solids => "solids",
    }
  }

  pub fn profile(&self) -> ModuleProfile {
    match self {
      ModuleId::Naming => ModuleProfile {
        module: *self,
        settings_key: "coordination-naming-settings",
        modes: &[ModeSpec { key: "naming", kind: AnswerKind::FreeText }],
        mastery: MasteryPolicy::new(6, 12),
        tracks_exclusions: true,
        difficulty_filter: true,
      },
      ModuleId::Coordination => ModuleProfile {
        module: *self,
        settings_key: "coordination-structures-settings",
        modes: &[
          ModeSpec { key: "match", kind: AnswerKind::Selection },
          ModeSpec { key: "build", kind: AnswerKind::Selection },
          ModeSpec { key: "ambiguity", kind: AnswerKind::Selection },
          ModeSpec { key: "rare", kind: AnswerKind::Selection },
        ],
        mastery: MasteryPolicy::new(6, 12),
        tracks_exclusions: true,
        difficulty_filter: false,
      },
      ModuleId::Bonding => ModuleProfile {
        module: *self,
        settings_key: "bonding-lft-settings",
        modes: &[
          ModeSpec { key: "builder", kind: AnswerKind::Orbital },
          ModeSpec { key: "series", kind: AnswerKind::Ordering },
          ModeSpec { key: "mo", kind: AnswerKind::Selection },
          ModeSpec { key: "spectra", kind: AnswerKind::FreeText },
        ],
        mastery: MasteryPolicy::new(6, 12),
        tracks_exclusions: false,
        difficulty_filter: false,
      },
      ModuleId::Isomerism => ModuleProfile {
        module: *self,
        settings_key: "coordination-isomerism-settings",
        modes: &[
          ModeSpec { key: "geometric", kind: AnswerKind::FreeText },
          ModeSpec { key: "optical", kind: AnswerKind::FreeText },
          ModeSpec { key: "structural", kind: AnswerKind::FreeText },
        ],
        mastery: MasteryPolicy::new(5, 10),
        tracks_exclusions: false,
        difficulty_filter: false,
      },
      ModuleId::Reactions => ModuleProfile {
        module: *self,
        settings_key: "coordination-reactions-settings",
        modes: &[
          ModeSpec { key: "rate", kind: AnswerKind::FreeText },
          ModeSpec { key: "path", kind: AnswerKind::FreeText },
          ModeSpec { key: "stereo", kind: AnswerKind::FreeText },
        ],
        mastery: MasteryPolicy::new(6, 12),
        tracks_exclusions: false,
        difficulty_filter: false,
      },
      ModuleId::Solids => ModuleProfile {
        module: *self,
        settings_key: "solid-state-settings",
        modes: &[
          ModeSpec { key: "identify", kind: AnswerKind::FreeText },
          ModeSpec { key: "count", kind: AnswerKind::FreeText },
          ModeSpec { key: "packing", kind: AnswerKind::FreeText },
          ModeSpec { key: "lattice", kind: AnswerKind::FreeText },
        ],
        mastery: MasteryPolicy::new(6, 12),
        tracks_exclusions: false,
        difficulty_filter: false,
      },
    }
  }
}

impl std::fmt::Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How answers in a mode are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
  FreeText,
  Selection,
  Ordering,
  Orbital,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModeSpec {
  pub key: &'static str,
  pub kind: AnswerKind,
}

/// Static per-module constants.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ModuleProfile {
  pub module: ModuleId,
  /// Key under which the module's settings snapshot is persisted.
  pub settings_key: &'static str,
  /// First entry is the default mode.
  pub modes: &'static [ModeSpec],
  pub mastery: MasteryPolicy,
  /// Avoid repeats within a pass over the pool.
  pub tracks_exclusions: bool,
  pub difficulty_filter: bool,
}

impl ModuleProfile {
  pub fn default_mode(&self) -> &'static str {
    self.modes[0].key
  }

  pub fn mode(&self, key: &str) -> Result<ModeSpec, CoreError> {
    self.modes
      .iter()
      .find(|m| m.key == key)
      .copied()
      .ok_or_else(|| CoreError::UnknownMode {
        module: self.module.to_string(),
        mode: key.to_string(),
      })
  }
}

/// What counts as a correct answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKey {
  /// Any of the accepted strings, compared after normalization.
  FreeText { accepted: Vec<String> },
  /// Every named field must match its expected value.
  Selection { fields: BTreeMap<String, String> },
  /// Exact positional sequence.
  Ordering { sequence: Vec<String> },
  /// Orbital placement plus declared spin state.
  Orbital { d_electrons: u8, spin: SpinState },
}

impl AnswerKey {
  pub fn kind(&self) -> AnswerKind {
    match self {
      AnswerKey::FreeText { .. } => AnswerKind::FreeText,
      AnswerKey::Selection { .. } => AnswerKind::Selection,
      AnswerKey::Ordering { .. } => AnswerKind::Ordering,
      AnswerKey::Orbital { .. } => AnswerKind::Orbital,
    }
  }
}

/// One practice item, fully typed. Built once at load time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub module: ModuleId,
  pub mode: String,
  /// Free-form category ("formula", "chelate", ...); feeds tagging.
  #[serde(default)] pub category: String,
  pub prompt: String,
  #[serde(default)] pub note: String,
  #[serde(default)] pub rationale: String,
  #[serde(default)] pub badge: String,
  #[serde(default)] pub formula: Option<String>,
  #[serde(default)] pub geometry: Option<String>,
  #[serde(default)] pub coordination_number: Option<u8>,
  /// Central atom symbol for structure models.
  #[serde(default)] pub central: Option<String>,
  /// Ligands in site order (or the items of an ordering task).
  #[serde(default)] pub ligands: Vec<String>,
  /// Explicit position → ligand assignment for structure models.
  #[serde(default)] pub ligand_sites: BTreeMap<String, String>,
  /// Choices offered per selection field (or for a single-choice question under "answer").
  #[serde(default)] pub options: BTreeMap<String, Vec<String>>,
  pub difficulty: String,
  pub tags: BTreeSet<String>,
  pub answer: AnswerKey,
}

impl Question {
  pub fn kind(&self) -> AnswerKind {
    self.answer.kind()
  }

  pub fn d_electrons(&self) -> Option<u8> {
    match self.answer {
      AnswerKey::Orbital { d_electrons, .. } => Some(d_electrons),
      _ => None,
    }
  }

  /// Number of shared tags with `other`.
  pub fn tag_overlap(&self, other: &Question) -> usize {
    self.tags.intersection(&other.tags).count()
  }
}
