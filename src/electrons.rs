//! Electron configuration model.
//!
//! - `expected_occupancy`: canonical d-orbital filling for a spin state
//! - `actual_occupancy`: tally of a learner's token placements
//! - `ligand_field_stabilization`: signed energy and pairing count of an occupancy
//! - `ElectronBoard`: the per-question set of electron tokens and where they sit
//!
//! High spin fills every `up` slot across the groups (lowest group first) before
//! any `down` slot. Low spin pairs each orbital completely before moving on,
//! group by group. Electrons beyond the geometry's capacity are dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::{GeometryConfig, GeometryRegistry};

/// Requested (or declared) spin state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinState {
    High,
    Low,
}

impl SpinState {
    /// Accepts `high`, `low`, `high spin`, `low-spin` in any case.
    pub fn parse(s: &str) -> Option<Self> {
        let cleaned = s.trim().to_lowercase().replace('-', " ");
        match cleaned.trim_end_matches(" spin").trim() {
            "high" => Some(SpinState::High),
            "low" => Some(SpinState::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpinState::High => "high",
            SpinState::Low => "low",
        }
    }
}

/// One of the two spin slots of an orbital.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinSlot {
    Up,
    Down,
}

/// Fill state of an orbital's two spin slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFill {
    pub up: bool,
    pub down: bool,
}

impl SlotFill {
    pub fn count(&self) -> usize {
        usize::from(self.up) + usize::from(self.down)
    }

    pub fn is_paired(&self) -> bool {
        self.up && self.down
    }

    pub fn get(&self, slot: SpinSlot) -> bool {
        match slot {
            SpinSlot::Up => self.up,
            SpinSlot::Down => self.down,
        }
    }

    fn set(&mut self, slot: SpinSlot) {
        match slot {
            SpinSlot::Up => self.up = true,
            SpinSlot::Down => self.down = true,
        }
    }
}

/// Orbital id → slot fill. Always lists every orbital of its geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    slots: BTreeMap<String, SlotFill>,
}

impl Occupancy {
    pub fn empty(cfg: &GeometryConfig) -> Self {
        Self {
            slots: cfg
                .order
                .iter()
                .map(|o| (o.clone(), SlotFill::default()))
                .collect(),
        }
    }

    pub fn get(&self, orbital: &str) -> SlotFill {
        self.slots.get(orbital).copied().unwrap_or_default()
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.values().map(SlotFill::count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SlotFill)> {
        self.slots.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Structural comparison over the geometry's orbital list.
    pub fn matches(&self, other: &Occupancy, cfg: &GeometryConfig) -> bool {
        cfg.order.iter().all(|o| self.get(o) == other.get(o))
    }

    fn fill(&mut self, orbital: &str, slot: SpinSlot) {
        if let Some(fill) = self.slots.get_mut(orbital) {
            fill.set(slot);
        }
    }
}

/// Canonical occupancy for `d_electrons` in `geometry` under `spin`.
pub fn expected_occupancy(
    registry: &GeometryRegistry,
    d_electrons: u8,
    geometry: &str,
    spin: SpinState,
) -> Result<Occupancy, CoreError> {
    let cfg = registry.get(geometry)?;
    Ok(fill_orbitals(cfg, d_electrons, spin))
}

/// Aufbau-style fill over the config's group order.
pub fn fill_orbitals(cfg: &GeometryConfig, d_electrons: u8, spin: SpinState) -> Occupancy {
    let mut occ = Occupancy::empty(cfg);
    let mut remaining = usize::from(d_electrons);

    match spin {
        SpinState::High => {
            for slot in [SpinSlot::Up, SpinSlot::Down] {
                for orbital in cfg.groups.iter().flatten() {
                    if remaining == 0 {
                        break;
                    }
                    if !occ.get(orbital).get(slot) {
                        occ.fill(orbital, slot);
                        remaining -= 1;
                    }
                }
            }
        }
        SpinState::Low => {
            for orbital in cfg.groups.iter().flatten() {
                if remaining == 0 {
                    break;
                }
                occ.fill(orbital, SpinSlot::Up);
                remaining -= 1;
                if remaining > 0 {
                    occ.fill(orbital, SpinSlot::Down);
                    remaining -= 1;
                }
            }
        }
    }
    occ
}

/// Where a token sits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub orbital: String,
    pub slot: SpinSlot,
}

/// Tally placements per orbital/slot. Placements on orbitals outside the
/// geometry are ignored; unplaced tokens simply contribute nothing.
pub fn actual_occupancy<'a, I>(cfg: &GeometryConfig, placements: I) -> Occupancy
where
    I: IntoIterator<Item = &'a Placement>,
{
    let mut occ = Occupancy::empty(cfg);
    for p in placements {
        occ.fill(&p.orbital, p.slot);
    }
    occ
}

/// Ligand-field stabilization of an occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stabilization {
    /// In units of the splitting parameter; negative is stabilizing.
    pub energy: f64,
    pub paired_orbital_count: usize,
}

pub fn ligand_field_stabilization(occ: &Occupancy, cfg: &GeometryConfig) -> Stabilization {
    let mut energy = 0.0;
    let mut paired = 0;
    for (orbital, fill) in occ.iter() {
        energy += fill.count() as f64 * cfg.energy(orbital);
        if fill.is_paired() {
            paired += 1;
        }
    }
    Stabilization {
        energy,
        paired_orbital_count: paired,
    }
}

/// Why a placement attempt did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRejection {
    SlotOccupied,
    UnknownToken,
    UnknownOrbital,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed,
    /// The token already sits in that slot.
    Unchanged,
    Rejected(PlacementRejection),
}

/// Electron tokens for one question instance and their placements.
#[derive(Clone, Debug, Serialize)]
pub struct ElectronBoard {
    question_id: String,
    geometry: String,
    tokens: Vec<String>,
    placements: BTreeMap<String, Placement>,
}

impl ElectronBoard {
    pub fn new(question_id: &str, geometry: &str, d_electrons: u8) -> Self {
        let tokens = (0..d_electrons)
            .map(|i| format!("e-{question_id}-{i}"))
            .collect();
        Self {
            question_id: question_id.to_string(),
            geometry: geometry.to_string(),
            tokens,
            placements: BTreeMap::new(),
        }
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn geometry(&self) -> &str {
        &self.geometry
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tokens still in the holding area, in creation order.
    pub fn unplaced(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| !self.placements.contains_key(t.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn placement_of(&self, token: &str) -> Option<&Placement> {
        self.placements.get(token)
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn occupant(&self, orbital: &str, slot: SpinSlot) -> Option<&str> {
        self.placements
            .iter()
            .find(|(_, p)| p.orbital == orbital && p.slot == slot)
            .map(|(t, _)| t.as_str())
    }

    /// Put `token` in `(orbital, slot)`, moving it if it was placed elsewhere.
    /// An occupied target slot rejects the move and leaves the board untouched.
    pub fn place(&mut self, cfg: &GeometryConfig, token: &str, orbital: &str, slot: SpinSlot) -> PlaceOutcome {
        if !self.tokens.iter().any(|t| t == token) {
            return PlaceOutcome::Rejected(PlacementRejection::UnknownToken);
        }
        if !cfg.has_orbital(orbital) {
            return PlaceOutcome::Rejected(PlacementRejection::UnknownOrbital);
        }
        match self.occupant(orbital, slot) {
            Some(t) if t == token => PlaceOutcome::Unchanged,
            Some(_) => PlaceOutcome::Rejected(PlacementRejection::SlotOccupied),
            None => {
                self.placements.insert(
                    token.to_string(),
                    Placement {
                        orbital: orbital.to_string(),
                        slot,
                    },
                );
                PlaceOutcome::Placed
            }
        }
    }

    /// Return a token to the holding area. Returns false if it was not placed.
    pub fn remove(&mut self, token: &str) -> bool {
        self.placements.remove(token).is_some()
    }

    pub fn actual_occupancy(&self, cfg: &GeometryConfig) -> Occupancy {
        actual_occupancy(cfg, self.placements.values())
    }
}
