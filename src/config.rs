//! Loading question content from TOML and turning raw records into typed
//! `Question`s.
//!
//! Schema: a list of `[[questions]]` tables, see `QuestionCfg`. The same
//! record type backs the built-in seeds, so every question goes through
//! `build_question` exactly once at load time.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::diagram::layout_names;
use crate::domain::{AnswerKey, AnswerKind, ModuleId, Question};
use crate::electrons::SpinState;
use crate::error::CoreError;
use crate::geometry::GeometryRegistry;
use crate::tagging::{clean_tags, derive_tags};

/// Largest d-electron count an orbital question may ask for.
pub const MAX_D_ELECTRONS: u8 = 10;

const CN_CHOICES: [&str; 6] = ["2", "4", "5", "6", "7", "8"];

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ContentConfig {
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML content banks.
/// Which answer fields matter depends on the answer kind of `mode`.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub module: ModuleId,
  pub mode: String,
  #[serde(default)] pub id: Option<String>,
  #[serde(default)] pub prompt: String,
  #[serde(default)] pub note: String,
  #[serde(default)] pub rationale: String,
  #[serde(default)] pub badge: String,
  #[serde(default, rename = "type")] pub category: Option<String>,
  #[serde(default)] pub formula: Option<String>,
  #[serde(default)] pub geometry: Option<String>,
  #[serde(default)] pub cn: Option<u8>,
  #[serde(default)] pub metal: Option<String>,
  #[serde(default)] pub ligands: Vec<String>,
  /// Position → ligand for structure models.
  #[serde(default)] pub sites: BTreeMap<String, String>,
  #[serde(default)] pub options: Vec<String>,
  #[serde(default)] pub difficulty: Option<String>,
  #[serde(default)] pub tags: Vec<String>,
  // orbital filling
  #[serde(default)] pub d_electrons: Option<u8>,
  #[serde(default)] pub spin: Option<String>,
  // free text
  #[serde(default)] pub accepted: Vec<String>,
  #[serde(default)] pub answer: Option<String>,
  // ordering
  #[serde(default)] pub sequence: Vec<String>,
  // selection
  #[serde(default)] pub selections: BTreeMap<String, String>,
  #[serde(default)] pub justification: Option<String>,
  #[serde(default)] pub justifications: Vec<String>,
  /// Explicit choice lists per selection field.
  #[serde(default)] pub choices: BTreeMap<String, Vec<String>>,
}

impl QuestionCfg {
  /// Empty record for `module`/`mode`; seeds fill in the rest.
  pub fn new(module: ModuleId, mode: &str) -> Self {
    Self {
      module,
      mode: mode.to_string(),
      id: None,
      prompt: String::new(),
      note: String::new(),
      rationale: String::new(),
      badge: String::new(),
      category: None,
      formula: None,
      geometry: None,
      cn: None,
      metal: None,
      ligands: Vec::new(),
      sites: BTreeMap::new(),
      options: Vec::new(),
      difficulty: None,
      tags: Vec::new(),
      d_electrons: None,
      spin: None,
      accepted: Vec::new(),
      answer: None,
      sequence: Vec::new(),
      selections: BTreeMap::new(),
      justification: None,
      justifications: Vec::new(),
      choices: BTreeMap::new(),
    }
  }
}

/// Attempt to load `ContentConfig` from CONTENT_PATH. On any parsing/IO error, returns None.
pub fn load_content_config_from_env() -> Option<ContentConfig> {
  let path = std::env::var("CONTENT_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_content(&s) {
      Ok(cfg) => {
        info!(target: "content", %path, questions = cfg.questions.len(), "Loaded content bank (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "content", %path, error = %e, "Failed to parse TOML content bank");
        None
      }
    },
    Err(e) => {
      error!(target: "content", %path, error = %e, "Failed to read TOML content bank");
      None
    }
  }
}

pub fn parse_content(s: &str) -> Result<ContentConfig, toml::de::Error> {
  toml::from_str::<ContentConfig>(s)
}

/// Validate a raw record and produce a typed question with defaults filled:
/// random id, difficulty `core`, derived tags.
pub fn build_question(cfg: &QuestionCfg, registry: &GeometryRegistry) -> Result<Question, CoreError> {
  let id = cfg
    .id
    .clone()
    .filter(|s| !s.trim().is_empty())
    .unwrap_or_else(|| Uuid::new_v4().to_string());
  let invalid = |reason: String| CoreError::InvalidContent { id: id.clone(), reason };

  let mode = cfg.module.profile().mode(cfg.mode.trim())?;
  let prompt = if cfg.prompt.trim().is_empty() {
    cfg.formula.clone().unwrap_or_default()
  } else {
    cfg.prompt.clone()
  };
  if prompt.trim().is_empty() {
    return Err(invalid("missing prompt".into()));
  }

  let mut options = BTreeMap::new();
  let answer = match mode.kind {
    AnswerKind::FreeText => {
      let mut accepted = cfg.accepted.clone();
      if let Some(a) = &cfg.answer {
        accepted.push(a.clone());
      }
      accepted.retain(|a| !a.trim().is_empty());
      if accepted.is_empty() {
        return Err(invalid("no accepted answers".into()));
      }
      if !cfg.options.is_empty() {
        options.insert("answer".to_string(), cfg.options.clone());
      }
      AnswerKey::FreeText { accepted }
    }
    AnswerKind::Selection => {
      let fields = selection_fields(cfg);
      if fields.is_empty() {
        return Err(invalid("no expected selections".into()));
      }
      for field in fields.keys() {
        let choices = selection_choices(cfg, field);
        if !choices.is_empty() {
          options.insert(field.clone(), choices);
        }
      }
      AnswerKey::Selection { fields }
    }
    AnswerKind::Ordering => {
      if cfg.sequence.is_empty() {
        return Err(invalid("empty ordering sequence".into()));
      }
      if !cfg.ligands.is_empty() && !same_items(&cfg.ligands, &cfg.sequence) {
        return Err(invalid("ordering items do not match the sequence".into()));
      }
      AnswerKey::Ordering { sequence: cfg.sequence.clone() }
    }
    AnswerKind::Orbital => {
      let geometry = cfg
        .geometry
        .as_deref()
        .ok_or_else(|| invalid("orbital question without geometry".into()))?;
      registry.get(geometry)?;
      let d_electrons = cfg
        .d_electrons
        .ok_or_else(|| invalid("orbital question without d-electron count".into()))?;
      if d_electrons > MAX_D_ELECTRONS {
        return Err(invalid(format!("{d_electrons} d-electrons exceeds {MAX_D_ELECTRONS}")));
      }
      let spin = cfg
        .spin
        .as_deref()
        .and_then(SpinState::parse)
        .ok_or_else(|| invalid("orbital question needs spin = high|low".into()))?;
      AnswerKey::Orbital { d_electrons, spin }
    }
  };

  let ligands = if cfg.ligands.is_empty() && mode.kind == AnswerKind::Ordering {
    cfg.sequence.clone()
  } else {
    cfg.ligands.clone()
  };

  let mut q = Question {
    id,
    module: cfg.module,
    mode: mode.key.to_string(),
    category: cfg.category.clone().unwrap_or_default(),
    prompt,
    note: cfg.note.clone(),
    rationale: cfg.rationale.clone(),
    badge: cfg.badge.clone(),
    formula: cfg.formula.clone(),
    geometry: cfg.geometry.clone(),
    coordination_number: cfg.cn,
    central: cfg.metal.clone(),
    ligands,
    ligand_sites: cfg.sites.clone(),
    options,
    difficulty: cfg
      .difficulty
      .clone()
      .filter(|d| !d.trim().is_empty())
      .unwrap_or_else(|| "core".to_string()),
    tags: Default::default(),
    answer,
  };
  q.tags = if cfg.tags.is_empty() { derive_tags(&q) } else { clean_tags(&cfg.tags) };
  Ok(q)
}

/// Explicit selections win; otherwise cn, geometry and justification are
/// expected whenever the record provides them.
fn selection_fields(cfg: &QuestionCfg) -> BTreeMap<String, String> {
  if !cfg.selections.is_empty() {
    return cfg.selections.clone();
  }
  let mut fields = BTreeMap::new();
  if let Some(cn) = cfg.cn {
    fields.insert("cn".to_string(), cn.to_string());
  }
  if let Some(g) = &cfg.geometry {
    fields.insert("geometry".to_string(), g.clone());
  }
  if let Some(j) = &cfg.justification {
    fields.insert("justification".to_string(), j.clone());
  }
  fields
}

fn selection_choices(cfg: &QuestionCfg, field: &str) -> Vec<String> {
  if let Some(c) = cfg.choices.get(field) {
    return c.clone();
  }
  match field {
    "cn" => CN_CHOICES.iter().map(|s| s.to_string()).collect(),
    "geometry" if !cfg.options.is_empty() => cfg.options.clone(),
    "geometry" => layout_names().map(str::to_string).collect(),
    "justification" => cfg.justifications.clone(),
    _ => Vec::new(),
  }
}

fn same_items(a: &[String], b: &[String]) -> bool {
  let mut a = a.to_vec();
  let mut b = b.to_vec();
  a.sort();
  b.sort();
  a == b
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toml_bank_parses_and_builds() {
    let raw = r#"
      [[questions]]
      module = "naming"
      mode = "naming"
      type = "formula"
      formula = "[Co(NH3)6]Cl3"
      geometry = "Octahedral"
      accepted = ["hexaamminecobalt(iii) chloride"]

      [[questions]]
      module = "bonding"
      mode = "builder"
      id = "d7-octa"
      prompt = "[Co(H2O)6]2+"
      geometry = "octahedral"
      d_electrons = 7
      spin = "high"
    "#;
    let cfg = parse_content(raw).unwrap();
    assert_eq!(cfg.questions.len(), 2);
    let reg = GeometryRegistry::standard();

    let naming = build_question(&cfg.questions[0], &reg).unwrap();
    assert_eq!(naming.prompt, "[Co(NH3)6]Cl3");
    assert_eq!(naming.difficulty, "core");
    assert!(Uuid::parse_str(&naming.id).is_ok());
    assert!(naming.tags.contains("ammine") && naming.tags.contains("formula"));

    let builder = build_question(&cfg.questions[1], &reg).unwrap();
    assert_eq!(builder.answer, AnswerKey::Orbital { d_electrons: 7, spin: SpinState::High });
  }

  #[test]
  fn orbital_questions_need_a_known_geometry_and_sane_count() {
    let reg = GeometryRegistry::standard();
    let mut cfg = QuestionCfg::new(ModuleId::Bonding, "builder");
    cfg.prompt = "[X]".into();
    cfg.geometry = Some("trigonal prismatic".into());
    cfg.d_electrons = Some(4);
    cfg.spin = Some("low".into());
    assert!(matches!(build_question(&cfg, &reg), Err(CoreError::UnknownGeometry(_))));

    cfg.geometry = Some("octahedral".into());
    cfg.d_electrons = Some(11);
    assert!(matches!(build_question(&cfg, &reg), Err(CoreError::InvalidContent { .. })));

    cfg.d_electrons = Some(4);
    cfg.spin = Some("intermediate".into());
    assert!(matches!(build_question(&cfg, &reg), Err(CoreError::InvalidContent { .. })));
  }

  #[test]
  fn selections_derive_from_cn_geometry_and_justification() {
    let mut cfg = QuestionCfg::new(ModuleId::Coordination, "ambiguity");
    cfg.prompt = "CN = 4, metal = Pt(II)".into();
    cfg.cn = Some(4);
    cfg.geometry = Some("square planar".into());
    cfg.justification = Some("d8 strong field favors square planar".into());
    cfg.options = vec!["square planar".into(), "tetrahedral".into()];
    cfg.justifications = vec!["d8 strong field favors square planar".into(), "weak field".into()];
    let q = build_question(&cfg, &GeometryRegistry::standard()).unwrap();
    let AnswerKey::Selection { fields } = &q.answer else { panic!("not a selection") };
    assert_eq!(fields.len(), 3);
    assert_eq!(q.options["geometry"].len(), 2);
    assert_eq!(q.options["cn"].len(), CN_CHOICES.len());
    assert_eq!(q.options["justification"].len(), 2);
  }

  #[test]
  fn ordering_items_must_match_sequence() {
    let mut cfg = QuestionCfg::new(ModuleId::Bonding, "series");
    cfg.prompt = "Order ligands".into();
    cfg.ligands = vec!["I-".into(), "CN-".into()];
    cfg.sequence = vec!["CN-".into(), "Cl-".into()];
    assert!(build_question(&cfg, &GeometryRegistry::standard()).is_err());
    cfg.sequence = vec!["CN-".into(), "I-".into()];
    assert!(build_question(&cfg, &GeometryRegistry::standard()).is_ok());
  }

  #[test]
  fn unknown_mode_is_rejected() {
    let mut cfg = QuestionCfg::new(ModuleId::Isomerism, "builder");
    cfg.prompt = "x".into();
    cfg.answer = Some("cis".into());
    assert!(matches!(
      build_question(&cfg, &GeometryRegistry::standard()),
      Err(CoreError::UnknownMode { .. })
    ));
  }

  #[test]
  fn explicit_tags_replace_derived_ones() {
    let mut cfg = QuestionCfg::new(ModuleId::Isomerism, "geometric");
    cfg.prompt = "Identify the isomer shown.".into();
    cfg.formula = Some("[Pt(NH3)2Cl2]".into());
    cfg.answer = Some("cis".into());
    cfg.tags = vec!["Cis/Trans".into()];
    let q = build_question(&cfg, &GeometryRegistry::standard()).unwrap();
    assert_eq!(q.tags.len(), 1);
    assert!(q.tags.contains("cis/trans"));
  }
}
