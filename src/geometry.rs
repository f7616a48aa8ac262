//! Crystal-field geometry registry.
//!
//! Each supported coordination geometry describes its d-orbital set: the
//! display order, the partition into degenerate energy groups (lowest first)
//! and the relative energy of every orbital in units of the splitting
//! parameter. The electron configuration model only ever reads these values.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Immutable description of one geometry's orbital splitting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub name: String,
    /// Orbital ids in display order (lowest energy first).
    pub order: Vec<String>,
    /// Degenerate groups, ascending energy.
    pub groups: Vec<Vec<String>>,
    pub energies: BTreeMap<String, f64>,
    /// Group label shown next to each orbital row (t2g, eg, ...).
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl GeometryConfig {
    /// Build a config from `(label, orbitals, energy)` groups given lowest first.
    /// The display order is the groups flattened.
    pub fn from_groups(name: &str, groups: &[(&str, &[&str], f64)]) -> Result<Self, CoreError> {
        let mut order = Vec::new();
        let mut out_groups = Vec::new();
        let mut energies = BTreeMap::new();
        let mut labels = BTreeMap::new();
        for (label, orbitals, energy) in groups {
            let members: Vec<String> = orbitals.iter().map(|o| o.to_string()).collect();
            for orbital in &members {
                order.push(orbital.clone());
                energies.insert(orbital.clone(), *energy);
                labels.insert(orbital.clone(), label.to_string());
            }
            out_groups.push(members);
        }
        let cfg = Self {
            name: name.to_string(),
            order,
            groups: out_groups,
            energies,
            labels,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check that every orbital sits in exactly one group, has an energy,
    /// groups are degenerate and the group order ascends in energy.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fail = |reason: String| CoreError::InvalidGeometryConfig {
            geometry: self.name.clone(),
            reason,
        };

        if self.order.is_empty() {
            return Err(fail("no orbitals".into()));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.is_empty() {
                return Err(fail("empty energy group".into()));
            }
            for orbital in group {
                if !seen.insert(orbital.as_str()) {
                    return Err(fail(format!("orbital '{orbital}' appears in more than one group")));
                }
            }
        }
        let in_order: HashSet<&str> = self.order.iter().map(String::as_str).collect();
        if in_order.len() != self.order.len() {
            return Err(fail("duplicate orbital in display order".into()));
        }
        if in_order != seen {
            return Err(fail("display order and groups list different orbitals".into()));
        }

        let mut previous: Option<f64> = None;
        for group in &self.groups {
            let mut level: Option<f64> = None;
            for orbital in group {
                let Some(energy) = self.energies.get(orbital).copied() else {
                    return Err(fail(format!("orbital '{orbital}' has no energy")));
                };
                match level {
                    None => level = Some(energy),
                    Some(l) if (l - energy).abs() > f64::EPSILON => {
                        return Err(fail(format!("group containing '{orbital}' is not degenerate")));
                    }
                    Some(_) => {}
                }
            }
            let level = level.unwrap_or_default();
            if let Some(p) = previous {
                if level < p {
                    return Err(fail("energy groups are not in ascending order".into()));
                }
            }
            previous = Some(level);
        }
        if self.energies.len() != self.order.len() {
            return Err(fail("energy table lists orbitals outside the geometry".into()));
        }
        Ok(())
    }

    /// Two spin slots per orbital.
    pub fn capacity(&self) -> usize {
        self.order.len() * 2
    }

    pub fn energy(&self, orbital: &str) -> f64 {
        self.energies.get(orbital).copied().unwrap_or(0.0)
    }

    pub fn label<'a>(&'a self, orbital: &'a str) -> &'a str {
        self.labels.get(orbital).map(String::as_str).unwrap_or(orbital)
    }

    pub fn has_orbital(&self, orbital: &str) -> bool {
        self.energies.contains_key(orbital)
    }
}

/// Lookup key used by the registry: geometry names are matched case-insensitively.
pub fn geometry_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Registry of crystal-field models, keyed by geometry name.
#[derive(Clone, Debug, Default)]
pub struct GeometryRegistry {
    configs: HashMap<String, GeometryConfig>,
}

impl GeometryRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Octahedral, tetrahedral and square planar splittings.
    pub fn standard() -> Self {
        let mut reg = Self::empty();
        for cfg in standard_configs() {
            reg.configs.insert(geometry_key(&cfg.name), cfg);
        }
        reg
    }

    /// Add or replace a geometry after validating it.
    pub fn register(&mut self, cfg: GeometryConfig) -> Result<(), CoreError> {
        cfg.validate()?;
        self.configs.insert(geometry_key(&cfg.name), cfg);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&GeometryConfig, CoreError> {
        self.configs
            .get(&geometry_key(name))
            .ok_or_else(|| CoreError::UnknownGeometry(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(&geometry_key(name))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.values().map(|c| c.name.clone()).collect();
        names.sort();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeometryConfig> {
        self.configs.values()
    }
}

fn standard_configs() -> Vec<GeometryConfig> {
    let table: [(&str, &[(&str, &[&str], f64)]); 3] = [
        (
            "octahedral",
            &[
                ("t2g", &["t2g1", "t2g2", "t2g3"], -0.4),
                ("eg", &["eg1", "eg2"], 0.6),
            ],
        ),
        (
            "tetrahedral",
            &[
                ("e", &["e1", "e2"], -0.6),
                ("t2", &["t2_1", "t2_2", "t2_3"], 0.4),
            ],
        ),
        (
            "square planar",
            &[
                ("dxz/dyz", &["dxz", "dyz"], -0.4),
                ("dz2", &["dz2"], 0.0),
                ("dxy", &["dxy"], 0.6),
                ("dx2-y2", &["dx2-y2"], 1.0),
            ],
        ),
    ];
    table
        .iter()
        .filter_map(|(name, groups)| GeometryConfig::from_groups(name, groups).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_three_geometries() {
        let reg = GeometryRegistry::standard();
        assert_eq!(reg.names(), vec!["octahedral", "square planar", "tetrahedral"]);
        let octa = reg.get("octahedral").unwrap();
        assert_eq!(octa.order, vec!["t2g1", "t2g2", "t2g3", "eg1", "eg2"]);
        assert_eq!(octa.capacity(), 10);
        assert_eq!(octa.label("eg2"), "eg");
        assert!((octa.energy("t2g3") + 0.4).abs() < 1e-12);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let reg = GeometryRegistry::standard();
        assert!(reg.get("Octahedral").is_ok());
        assert!(reg.get(" Square Planar ").is_ok());
    }

    #[test]
    fn unknown_geometry_is_reported() {
        let reg = GeometryRegistry::standard();
        let err = reg.get("trigonal prismatic").unwrap_err();
        assert_eq!(err, CoreError::UnknownGeometry("trigonal prismatic".into()));
    }

    #[test]
    fn every_standard_config_satisfies_invariants() {
        for cfg in GeometryRegistry::standard().iter() {
            cfg.validate().unwrap();
            let grouped: usize = cfg.groups.iter().map(Vec::len).sum();
            assert_eq!(grouped, cfg.order.len(), "{}", cfg.name);
        }
    }

    #[test]
    fn descending_groups_are_rejected() {
        let err = GeometryConfig::from_groups(
            "upside down",
            &[("high", &["a"], 0.6), ("low", &["b"], -0.4)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidGeometryConfig { .. }));
    }

    #[test]
    fn orbital_in_two_groups_is_rejected() {
        let err = GeometryConfig::from_groups(
            "twice",
            &[("low", &["a", "b"], -0.4), ("high", &["b"], 0.6)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidGeometryConfig { .. }));
    }

    #[test]
    fn register_validates() {
        let mut reg = GeometryRegistry::empty();
        let mut cfg = GeometryRegistry::standard().get("octahedral").unwrap().clone();
        cfg.energies.remove("eg2");
        assert!(reg.register(cfg).is_err());
        assert!(!reg.contains("octahedral"));
    }
}
