//! Diagram data handed to the rendering layer.
//!
//! Renderers only consume these values; grading never reads them back.
//!
//! - `OrbitalDiagram`: rows of the d-orbital splitting with live placements
//! - `StructureModel`: idealized ligand positions plus an XYZ block for a 3-D viewer

use serde::Serialize;

use crate::domain::Question;
use crate::electrons::{ligand_field_stabilization, ElectronBoard, SpinSlot, Stabilization};
use crate::error::CoreError;
use crate::geometry::{geometry_key, GeometryConfig};
use crate::settings::ColorMode;

/// Bond length used to scale the unit layouts, in Å.
pub const BOND_SCALE: f64 = 2.2;

const OVERLAP_BANDS: [&str; 2] = ["sigma overlap", "pi overlap"];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagramView {
    Orbital(OrbitalDiagram),
    Structure(StructureModel),
    /// The geometry has no layout or crystal-field model.
    Unavailable { geometry: String, message: String },
}

impl DiagramView {
    pub fn unavailable(geometry: &str) -> Self {
        DiagramView::Unavailable {
            geometry: geometry.to_string(),
            message: "no model available".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrbitalRow {
    pub id: String,
    /// Group label (t2g, eg, ...); hidden with the scaffold.
    pub label: Option<String>,
    pub energy: f64,
    pub up: bool,
    pub down: bool,
    pub up_token: Option<String>,
    pub down_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrbitalDiagram {
    pub geometry: String,
    pub rows: Vec<OrbitalRow>,
    pub unplaced: Vec<String>,
    /// Stabilization of the learner's current placement.
    pub stabilization: Stabilization,
    pub overlap_bands: Vec<String>,
}

pub fn orbital_diagram(
    board: &ElectronBoard,
    cfg: &GeometryConfig,
    show_labels: bool,
    show_overlap: bool,
) -> OrbitalDiagram {
    let occ = board.actual_occupancy(cfg);
    let rows = cfg
        .order
        .iter()
        .map(|orbital| {
            let fill = occ.get(orbital);
            OrbitalRow {
                id: orbital.clone(),
                label: show_labels.then(|| cfg.label(orbital).to_string()),
                energy: cfg.energy(orbital),
                up: fill.up,
                down: fill.down,
                up_token: board.occupant(orbital, SpinSlot::Up).map(str::to_string),
                down_token: board.occupant(orbital, SpinSlot::Down).map(str::to_string),
            }
        })
        .collect();

    OrbitalDiagram {
        geometry: cfg.name.clone(),
        rows,
        unplaced: board.unplaced().into_iter().map(str::to_string).collect(),
        stabilization: ligand_field_stabilization(&occ, cfg),
        overlap_bands: if show_overlap {
            OVERLAP_BANDS.iter().map(|b| b.to_string()).collect()
        } else {
            Vec::new()
        },
    }
}

/// Unit-vector ligand positions of one coordination geometry.
#[derive(Debug)]
pub struct Layout {
    pub name: &'static str,
    pub positions: &'static [(&'static str, [f64; 3])],
}

impl Layout {
    pub fn coordination_number(&self) -> usize {
        self.positions.len()
    }
}

static LAYOUTS: &[Layout] = &[
    Layout {
        name: "octahedral",
        positions: &[
            ("top", [0.0, 0.0, 1.0]),
            ("bottom", [0.0, 0.0, -1.0]),
            ("left", [-1.0, 0.0, 0.0]),
            ("right", [1.0, 0.0, 0.0]),
            ("front", [0.0, 1.0, 0.0]),
            ("back", [0.0, -1.0, 0.0]),
        ],
    },
    Layout {
        name: "tetrahedral",
        positions: &[
            ("top", [1.0, 1.0, 1.0]),
            ("bottom", [-1.0, -1.0, 1.0]),
            ("left", [-1.0, 1.0, -1.0]),
            ("right", [1.0, -1.0, -1.0]),
        ],
    },
    Layout {
        name: "square planar",
        positions: &[
            ("top", [0.0, 1.0, 0.0]),
            ("bottom", [0.0, -1.0, 0.0]),
            ("left", [-1.0, 0.0, 0.0]),
            ("right", [1.0, 0.0, 0.0]),
        ],
    },
    Layout {
        name: "trigonal bipyramidal",
        positions: &[
            ("top", [0.0, 0.0, 1.0]),
            ("bottom", [0.0, 0.0, -1.0]),
            ("left", [-1.0, 0.0, 0.0]),
            ("right", [1.0, 0.0, 0.0]),
            ("front", [0.0, 1.0, 0.0]),
        ],
    },
    Layout {
        name: "square pyramidal",
        positions: &[
            ("top", [0.0, 0.0, 1.0]),
            ("left", [-1.0, 0.0, 0.0]),
            ("right", [1.0, 0.0, 0.0]),
            ("front", [0.0, 1.0, 0.0]),
            ("back", [0.0, -1.0, 0.0]),
        ],
    },
    Layout {
        name: "pentagonal bipyramidal",
        positions: &[
            ("top", [0.0, 0.0, 1.0]),
            ("bottom", [0.0, 0.0, -1.0]),
            ("eq1", [1.0, 0.0, 0.0]),
            ("eq2", [0.309, 0.951, 0.0]),
            ("eq3", [-0.809, 0.588, 0.0]),
            ("eq4", [-0.809, -0.588, 0.0]),
            ("eq5", [0.309, -0.951, 0.0]),
        ],
    },
    Layout {
        name: "square antiprismatic",
        positions: &[
            ("t1", [1.0, 0.0, 0.8]),
            ("t2", [0.0, 1.0, 0.8]),
            ("t3", [-1.0, 0.0, 0.8]),
            ("t4", [0.0, -1.0, 0.8]),
            ("b1", [0.707, 0.707, -0.8]),
            ("b2", [-0.707, 0.707, -0.8]),
            ("b3", [-0.707, -0.707, -0.8]),
            ("b4", [0.707, -0.707, -0.8]),
        ],
    },
    Layout {
        name: "linear",
        positions: &[("left", [-1.0, 0.0, 0.0]), ("right", [1.0, 0.0, 0.0])],
    },
];

pub fn layout(geometry: &str) -> Option<&'static Layout> {
    let key = geometry_key(geometry);
    LAYOUTS.iter().find(|l| l.name == key)
}

pub fn layout_names() -> impl Iterator<Item = &'static str> {
    LAYOUTS.iter().map(|l| l.name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomRole {
    Metal,
    Neutral,
    Anionic,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructureAtom {
    pub element: String,
    pub role: AtomRole,
    pub position: [f64; 3],
    pub color: &'static str,
    /// Ligand or metal label; hidden with the scaffold.
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StructureModel {
    pub geometry: String,
    pub atoms: Vec<StructureAtom>,
    pub xyz: String,
}

/// Ball-and-stick model for `question`. Fails for geometries without a layout.
pub fn structure_model(
    question: &Question,
    color_mode: ColorMode,
    show_labels: bool,
) -> Result<StructureModel, CoreError> {
    let geometry = question.geometry.as_deref().unwrap_or_default();
    let layout = layout(geometry).ok_or_else(|| CoreError::UnknownGeometry(geometry.to_string()))?;

    let metal_label = question.central.clone().unwrap_or_else(|| "M".to_string());
    let mut atoms = vec![make_atom(
        metal_symbol(question),
        AtomRole::Metal,
        [0.0, 0.0, 0.0],
        metal_label,
        color_mode,
        show_labels,
    )];

    for (index, (position, unit)) in layout.positions.iter().enumerate() {
        let ligand = if question.ligand_sites.is_empty() {
            question.ligands.get(index).cloned().unwrap_or_else(|| "L".to_string())
        } else {
            match question.ligand_sites.get(*position) {
                Some(l) => l.clone(),
                None => continue,
            }
        };
        let role = if ligand.contains('-') { AtomRole::Anionic } else { AtomRole::Neutral };
        let coords = unit.map(|v| v * BOND_SCALE);
        atoms.push(make_atom(ligand_element(&ligand).to_string(), role, coords, ligand, color_mode, show_labels));
    }

    let xyz = xyz_block(&question.prompt, &atoms);
    Ok(StructureModel {
        geometry: layout.name.to_string(),
        atoms,
        xyz,
    })
}

fn make_atom(
    element: String,
    role: AtomRole,
    position: [f64; 3],
    label: String,
    color_mode: ColorMode,
    show_labels: bool,
) -> StructureAtom {
    let color = atom_color(&element, role, color_mode);
    StructureAtom {
        element,
        role,
        position,
        color,
        label: show_labels.then_some(label),
    }
}

/// Explicit central atom (letters only), else the first element symbol in the prompt.
fn metal_symbol(question: &Question) -> String {
    if let Some(central) = &question.central {
        let letters: String = central.chars().filter(|c| c.is_ascii_alphabetic()).collect();
        if !letters.is_empty() {
            return letters;
        }
    }
    let chars: Vec<char> = question.prompt.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let mut symbol = c.to_string();
            if let Some(next) = chars.get(i + 1).filter(|n| n.is_ascii_lowercase()) {
                symbol.push(*next);
            }
            return symbol;
        }
    }
    "M".to_string()
}

/// Donor atom guessed from a ligand label.
pub fn ligand_element(label: &str) -> &'static str {
    const PREFIXES: &[(&str, &str)] = &[
        ("Cl", "Cl"),
        ("NH", "N"),
        ("H2O", "O"),
        ("OH", "O"),
        ("CN", "C"),
        ("CO", "C"),
        ("NO", "N"),
        ("P", "P"),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _)| label.starts_with(prefix))
        .map(|(_, element)| *element)
        .unwrap_or("C")
}

pub fn atom_color(element: &str, role: AtomRole, mode: ColorMode) -> &'static str {
    match mode {
        ColorMode::Donor => match element {
            "Cl" => "#4b6cb7",
            "N" => "#1f8a8a",
            "O" => "#d06b28",
            "S" => "#7a6a5e",
            "C" => "#6b5c4b",
            "P" => "#ad6c1c",
            _ => "#0f3d3e",
        },
        ColorMode::Charge => match role {
            AtomRole::Metal => "#0f3d3e",
            AtomRole::Neutral => "#d66b2d",
            AtomRole::Anionic => "#2b6cb0",
        },
    }
}

fn xyz_block(title: &str, atoms: &[StructureAtom]) -> String {
    let mut lines = Vec::with_capacity(atoms.len() + 2);
    lines.push(atoms.len().to_string());
    lines.push(format!("{title} geometry model"));
    for a in atoms {
        let [x, y, z] = a.position;
        lines.push(format!("{} {:.4} {:.4} {:.4}", a.element, x, y, z));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnswerKey, ModuleId};
    use crate::geometry::GeometryRegistry;
    use std::collections::{BTreeMap, BTreeSet};

    fn structure_question(prompt: &str, geometry: &str, ligands: &[&str]) -> Question {
        Question {
            id: "s1".into(),
            module: ModuleId::Coordination,
            mode: "match".into(),
            category: String::new(),
            prompt: prompt.into(),
            note: String::new(),
            rationale: String::new(),
            badge: String::new(),
            formula: None,
            geometry: Some(geometry.into()),
            coordination_number: None,
            central: None,
            ligands: ligands.iter().map(|l| l.to_string()).collect(),
            ligand_sites: BTreeMap::new(),
            options: BTreeMap::new(),
            difficulty: "core".into(),
            tags: BTreeSet::new(),
            answer: AnswerKey::Selection { fields: BTreeMap::new() },
        }
    }

    #[test]
    fn every_layout_matches_its_coordination_number() {
        let expected = [
            ("octahedral", 6),
            ("tetrahedral", 4),
            ("square planar", 4),
            ("trigonal bipyramidal", 5),
            ("square pyramidal", 5),
            ("pentagonal bipyramidal", 7),
            ("square antiprismatic", 8),
            ("linear", 2),
        ];
        for (name, cn) in expected {
            assert_eq!(layout(name).unwrap().coordination_number(), cn, "{name}");
        }
        assert_eq!(layout_names().count(), expected.len());
    }

    #[test]
    fn octahedral_model_has_metal_and_six_ligands() {
        let q = structure_question("[CoCl6]3-", "Octahedral", &["Cl-", "Cl-", "NH3", "NH3", "H2O", "H2O"]);
        let m = structure_model(&q, ColorMode::Donor, true).unwrap();
        assert_eq!(m.atoms.len(), 7);
        assert_eq!(m.atoms[0].element, "Co");
        assert_eq!(m.atoms[0].role, AtomRole::Metal);
        assert_eq!(m.atoms[1].role, AtomRole::Anionic);
        assert_eq!(m.atoms[1].color, "#4b6cb7");
        assert_eq!(m.atoms[3].element, "N");

        let lines: Vec<&str> = m.xyz.lines().collect();
        assert_eq!(lines[0], "7");
        assert_eq!(lines[1], "[CoCl6]3- geometry model");
        assert_eq!(lines[2], "Co 0.0000 0.0000 0.0000");
        assert_eq!(lines[3], "Cl 0.0000 0.0000 2.2000");
    }

    #[test]
    fn charge_colors_and_hidden_labels() {
        let q = structure_question("[Ag(NH3)2]+", "linear", &["NH3"]);
        let m = structure_model(&q, ColorMode::Charge, false).unwrap();
        assert_eq!(m.atoms[0].color, "#0f3d3e");
        assert_eq!(m.atoms[1].color, "#d66b2d");
        // Missing ligand falls back to a generic "L".
        assert_eq!(m.atoms[2].element, "C");
        assert!(m.atoms.iter().all(|a| a.label.is_none()));
    }

    #[test]
    fn site_map_places_only_named_positions() {
        let mut q = structure_question("[Pt(NH3)2Cl2]", "square planar", &[]);
        q.central = Some("Pt".into());
        q.ligand_sites.insert("top".into(), "NH3".into());
        q.ligand_sites.insert("left".into(), "Cl-".into());
        let m = structure_model(&q, ColorMode::Donor, true).unwrap();
        assert_eq!(m.atoms.len(), 3);
        assert_eq!(m.atoms[0].label.as_deref(), Some("Pt"));
    }

    #[test]
    fn unknown_geometry_has_no_model() {
        let q = structure_question("[X]", "see-saw", &[]);
        assert!(matches!(
            structure_model(&q, ColorMode::Donor, true),
            Err(CoreError::UnknownGeometry(_))
        ));
    }

    #[test]
    fn orbital_diagram_reports_tokens_and_live_cfse() {
        let reg = GeometryRegistry::standard();
        let cfg = reg.get("octahedral").unwrap();
        let mut board = ElectronBoard::new("q", "octahedral", 3);
        board.place(cfg, "e-q-0", "t2g1", SpinSlot::Up);
        board.place(cfg, "e-q-1", "eg1", SpinSlot::Up);

        let d = orbital_diagram(&board, cfg, true, true);
        assert_eq!(d.rows.len(), 5);
        assert_eq!(d.rows[0].up_token.as_deref(), Some("e-q-0"));
        assert_eq!(d.rows[0].label.as_deref(), Some("t2g"));
        assert_eq!(d.unplaced, vec!["e-q-2".to_string()]);
        assert!((d.stabilization.energy - 0.2).abs() < 1e-9);
        assert_eq!(d.overlap_bands.len(), 2);

        let hidden = orbital_diagram(&board, cfg, false, false);
        assert!(hidden.rows.iter().all(|r| r.label.is_none()));
        assert!(hidden.overlap_bands.is_empty());
    }
}
