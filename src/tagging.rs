//! Tag derivation for similarity lookup.
//!
//! Tags are lower-cased tokens; only their overlap between two questions is
//! ever used (remediation picks the most similar question).

use std::collections::BTreeSet;

use crate::domain::Question;

/// Formula substrings and the ligand tag each one implies. Case-sensitive.
const LIGAND_TAGS: &[(&str, &str)] = &[
  ("NH3", "ammine"),
  ("H2O", "aqua"),
  ("Cl", "chloro"),
  ("CN", "cyano"),
  ("CO", "carbonyl"),
  ("en", "ethylenediamine"),
  ("NO2", "nitro"),
  ("ONO", "nitrito"),
  ("NCS", "thiocyanato"),
  ("SCN", "thiocyanato"),
  ("OH", "hydroxo"),
  ("C2O4", "oxalato"),
  ("acac", "acac"),
  ("gly", "glycinato"),
  ("mu-", "bridging"),
];

const ISOMER_MARKERS: &[&str] = &["cis-", "trans-"];

/// Tags for a question: category (or mode), geometry, coordination number,
/// listed ligand tokens, formula ligand tags and isomer markers.
pub fn derive_tags(q: &Question) -> BTreeSet<String> {
  let mut tags = BTreeSet::new();

  let category = if q.category.trim().is_empty() { &q.mode } else { &q.category };
  insert_tag(&mut tags, category);

  if let Some(geometry) = &q.geometry {
    insert_tag(&mut tags, geometry);
  }
  if let Some(cn) = q.coordination_number {
    tags.insert(format!("cn{cn}"));
  }
  for ligand in &q.ligands {
    if let Some(token) = ligand.split_whitespace().next() {
      insert_tag(&mut tags, token);
    }
  }

  if let Some(formula) = &q.formula {
    for (token, tag) in LIGAND_TAGS {
      if formula.contains(token) {
        tags.insert((*tag).to_string());
      }
    }
    if ISOMER_MARKERS.iter().any(|m| formula.contains(m)) {
      tags.insert("isomer".to_string());
    }
  }
  tags
}

/// Lower-case and trim explicit tags.
pub fn clean_tags<I, S>(raw: I) -> BTreeSet<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut tags = BTreeSet::new();
  for t in raw {
    insert_tag(&mut tags, t.as_ref());
  }
  tags
}

fn insert_tag(tags: &mut BTreeSet<String>, raw: &str) {
  let t = raw.trim().to_lowercase();
  if !t.is_empty() {
    tags.insert(t);
  }
}
