//! Built-in question banks. These guarantee every module/mode has content
//! even without an external CONTENT_PATH bank.

use std::collections::BTreeMap;

use crate::config::QuestionCfg;
use crate::domain::ModuleId;

const OCTAHEDRAL_SITES: [&str; 6] = ["top", "bottom", "left", "right", "front", "back"];
const SQUARE_SITES: [&str; 4] = ["top", "bottom", "left", "right"];
const STRUCTURAL_KINDS: [&str; 4] = ["ionization", "linkage", "coordination", "hydrate/solvate"];
const MECHANISMS: [&str; 3] = ["D", "I", "A"];
const STEREO_OUTCOMES: [&str; 3] = ["retention", "alteration", "mixture"];

/// Every built-in record, all modules.
pub fn seed_questions() -> Vec<QuestionCfg> {
  let mut all = naming_seeds();
  all.extend(coordination_seeds());
  all.extend(bonding_seeds());
  all.extend(isomerism_seeds());
  all.extend(reaction_seeds());
  all.extend(solid_seeds());
  all
}

fn sites(positions: &[&str], ligands: &[&str]) -> BTreeMap<String, String> {
  positions
    .iter()
    .zip(ligands)
    .map(|(p, l)| (p.to_string(), l.to_string()))
    .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn naming(
  id: &str,
  kind: &str,
  formula: &str,
  difficulty: Option<&str>,
  ligands: [&str; 6],
  accepted: &[&str],
  rationale: &str,
) -> QuestionCfg {
  let metal: String = formula
    .split('[')
    .nth(1)
    .map(|inner| {
      let mut chars = inner.chars();
      let mut symbol: String = chars.next().into_iter().collect();
      symbol.extend(chars.next().filter(|c| c.is_ascii_lowercase()));
      symbol
    })
    .unwrap_or_default();
  let mut q = QuestionCfg::new(ModuleId::Naming, "naming");
  q.id = Some(id.into());
  q.category = Some(kind.into());
  q.formula = Some(formula.into());
  q.prompt = formula.into();
  q.geometry = Some("Octahedral".into());
  q.note = "Provide the full IUPAC name, including oxidation state and counter ion.".into();
  q.difficulty = difficulty.map(str::to_string);
  q.metal = (!metal.is_empty()).then_some(metal);
  q.sites = sites(&OCTAHEDRAL_SITES, &ligands);
  q.accepted = strings(accepted);
  q.rationale = rationale.into();
  q
}

fn naming_seeds() -> Vec<QuestionCfg> {
  let amm6 = ["NH3"; 6];
  let aqua6 = ["H2O"; 6];
  let cl6 = ["Cl-"; 6];
  let cn6 = ["CN-"; 6];
  vec![
    naming(
      "name-cr-tetraammine-dichloro",
      "2D structure",
      "[Cr(NH3)4Cl2]Cl",
      None,
      ["NH3", "NH3", "NH3", "NH3", "Cl-", "Cl-"],
      &["tetraammine dichlorochromium(iii) chloride", "tetraamminedichlorochromium(iii) chloride"],
      "Cr is +3 (ammine neutral, two chloro ligands, one counter chloride).",
    ),
    naming(
      "name-co-hexaammine",
      "formula",
      "[Co(NH3)6]Cl3",
      Some("intro"),
      amm6,
      &["hexaamminecobalt(iii) chloride"],
      "Six neutral ammine ligands; three chloride counter ions imply Co(III).",
    ),
    naming(
      "name-pt-hexachloro",
      "formula",
      "K2[PtCl6]",
      None,
      cl6,
      &["potassium hexachloroplatinate(iv)"],
      "Complex is 2-; Pt is +4, so platinate(IV).",
    ),
    naming(
      "name-cu-en-aqua",
      "2D structure",
      "[Cu(en)2(H2O)2]SO4",
      None,
      ["H2O", "H2O", "en", "en", "en", "en"],
      &[
        "diaqua bis(ethylenediamine)copper(ii) sulfate",
        "diaqua bis(ethylenediamine) copper(ii) sulfate",
      ],
      "Sulfate is 2-, so Cu is +2. Aqua before ethylenediamine.",
    ),
    naming(
      "name-fe-hexacyano-ii",
      "formula",
      "K4[Fe(CN)6]",
      None,
      cn6,
      &["potassium hexacyanoferrate(ii)"],
      "Complex is 4-; six cyanide ligands leave Fe(II).",
    ),
    naming(
      "name-fe-hexacyano-iii",
      "formula",
      "K3[Fe(CN)6]",
      None,
      cn6,
      &["potassium hexacyanoferrate(iii)"],
      "Complex is 3-; six cyanide ligands leave Fe(III).",
    ),
    naming(
      "name-co-pentaammine-chloro",
      "formula",
      "[Co(NH3)5Cl]Cl2",
      None,
      ["NH3", "NH3", "NH3", "NH3", "NH3", "Cl-"],
      &["pentaamminechlorocobalt(iii) chloride"],
      "One chloro ligand and two counter chlorides give Co(III).",
    ),
    naming(
      "name-cr-hexaaqua",
      "formula",
      "[Cr(H2O)6]Cl3",
      Some("intro"),
      aqua6,
      &["hexaaquachromium(iii) chloride"],
      "Neutral aqua ligands; three chlorides imply Cr(III).",
    ),
    naming(
      "name-ni-hexaaqua",
      "formula",
      "[Ni(H2O)6]Cl2",
      Some("intro"),
      aqua6,
      &["hexaaquanickel(ii) chloride"],
      "Neutral aqua ligands; two chlorides imply Ni(II).",
    ),
    naming(
      "name-co-tris-en",
      "formula",
      "[Co(en)3]Cl3",
      None,
      ["en"; 6],
      &["tris(ethylenediamine)cobalt(iii) chloride", "tris(ethylenediamine) cobalt(iii) chloride"],
      "Use tris for three bidentate ethylenediamine ligands.",
    ),
    naming(
      "name-co-cis-tetraammine",
      "isomer",
      "cis-[Co(NH3)4Cl2]Cl",
      Some("advanced"),
      ["NH3", "NH3", "NH3", "Cl-", "NH3", "Cl-"],
      &["cis-tetraamminedichlorocobalt(iii) chloride"],
      "The two chloro ligands are adjacent; keep the cis- prefix.",
    ),
    naming(
      "name-co-trans-tetraammine",
      "isomer",
      "trans-[Co(NH3)4Cl2]Cl",
      Some("advanced"),
      ["NH3", "NH3", "NH3", "NH3", "Cl-", "Cl-"],
      &["trans-tetraamminedichlorocobalt(iii) chloride"],
      "The two chloro ligands are opposite; keep the trans- prefix.",
    ),
  ]
}

fn structure(
  id: &str,
  mode: &str,
  prompt: &str,
  note: &str,
  metal: Option<&str>,
  cn: u8,
  geometry: &str,
  ligands: &[&str],
) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Coordination, mode);
  q.id = Some(id.into());
  q.prompt = prompt.into();
  q.note = note.into();
  q.metal = metal.map(str::to_string);
  q.cn = Some(cn);
  q.geometry = Some(geometry.into());
  q.ligands = strings(ligands);
  if mode == "match" {
    q.formula = Some(prompt.into());
  }
  q
}

fn ambiguity(
  id: &str,
  prompt: &str,
  note: &str,
  metal: &str,
  cn: u8,
  geometry: &str,
  justification: &str,
  options: [&str; 2],
  justifications: [&str; 2],
) -> QuestionCfg {
  let mut q = structure(id, "ambiguity", prompt, note, Some(metal), cn, geometry, &[]);
  q.selections = BTreeMap::from([
    ("geometry".to_string(), geometry.to_string()),
    ("justification".to_string(), justification.to_string()),
  ]);
  q.options = strings(&options);
  q.justifications = strings(&justifications);
  q
}

fn rare(id: &str, note: &str, metal: &str, cn: u8, geometry: &str) -> QuestionCfg {
  let prompt = format!("Identify the geometry for CN {cn} model.");
  let mut q = structure(id, "rare", &prompt, note, Some(metal), cn, geometry, &[]);
  q.selections = BTreeMap::from([("geometry".to_string(), geometry.to_string())]);
  q
}

fn coordination_seeds() -> Vec<QuestionCfg> {
  vec![
    structure("match-co-en", "match", "[Co(en)2Cl2]+", "en is bidentate. Determine CN and geometry.", None, 6, "octahedral", &["en", "en", "Cl-", "Cl-"]),
    structure("match-ni-cn", "match", "[Ni(CN)4]2-", "d8 metal, strong field.", None, 4, "square planar", &["CN-"; 4]),
    structure("match-zn-cl", "match", "[ZnCl4]2-", "Main group metal, weak field.", None, 4, "tetrahedral", &["Cl-"; 4]),
    structure("match-ag-nh3", "match", "[Ag(NH3)2]+", "Coordination number 2.", None, 2, "linear", &["NH3", "NH3"]),
    structure("match-fe-cn", "match", "[Fe(CN)6]4-", "Classic octahedral coordination.", None, 6, "octahedral", &["CN-"; 6]),
    structure("match-ni-co", "match", "[Ni(CO)4]", "Zero oxidation state, tetrahedral.", None, 4, "tetrahedral", &["CO"; 4]),
    structure("match-pt-nh3-cl", "match", "[Pt(NH3)2Cl2]", "Square planar d8 complex.", None, 4, "square planar", &["NH3", "NH3", "Cl-", "Cl-"]),
    structure("match-fe-aqua", "match", "[Fe(H2O)6]2+", "Hexaaqua complex.", None, 6, "octahedral", &["H2O"; 6]),
    structure("build-co-en-cl", "build", "Ligands: en x2, Cl- x2", "Compute CN from denticity before choosing geometry.", Some("Co"), 6, "octahedral", &["en (bidentate)", "en (bidentate)", "Cl-", "Cl-"]),
    structure("build-fe-bpy", "build", "Ligands: bpy x3 (each bidentate)", "Each bpy occupies two sites.", Some("Fe"), 6, "octahedral", &["bpy", "bpy", "bpy"]),
    structure("build-ni-pph3", "build", "Ligands: PPh3 x4", "Neutral monodentate ligands.", Some("Ni"), 4, "tetrahedral", &["PPh3"; 4]),
    structure("build-pt-en", "build", "Ligands: en x2", "Two bidentate ligands.", Some("Pt"), 4, "square planar", &["en", "en"]),
    structure("build-ca-edta", "build", "Ligands: EDTA4- (hexadentate)", "Single ligand wraps around the metal.", Some("Ca"), 6, "octahedral", &["EDTA (hexadentate)"]),
    structure("build-fe-no2", "build", "Ligands: NO2- x5", "CN 5 candidates: trigonal bipyramidal vs square pyramidal.", Some("Fe"), 5, "trigonal bipyramidal", &["NO2-"; 5]),
    ambiguity(
      "ambiguity-pt",
      "CN = 4, metal = Pt(II), strong field ligands",
      "Choose geometry and justify.",
      "Pt",
      4,
      "square planar",
      "d8 strong field favors square planar",
      ["square planar", "tetrahedral"],
      ["d8 strong field favors square planar", "weak field favors tetrahedral"],
    ),
    ambiguity(
      "ambiguity-zn",
      "CN = 4, metal = Zn(II), halide ligands",
      "Choose geometry and justify.",
      "Zn",
      4,
      "tetrahedral",
      "d10 weak field favors tetrahedral",
      ["square planar", "tetrahedral"],
      ["d8 strong field favors square planar", "d10 weak field favors tetrahedral"],
    ),
    ambiguity(
      "ambiguity-fe",
      "CN = 5, metal = Fe(III) with mixed ligands",
      "Choose the more common geometry.",
      "Fe",
      5,
      "square pyramidal",
      "square pyramidal slightly more common for CN 5",
      ["square pyramidal", "trigonal bipyramidal"],
      ["square pyramidal slightly more common for CN 5", "trigonal bipyramidal dominates for CN 5"],
    ),
    rare("rare-tbp", "Use the 3D structure cues.", "Fe", 5, "trigonal bipyramidal"),
    rare("rare-sqpy", "Use the 3D structure cues.", "Fe", 5, "square pyramidal"),
    rare("rare-pbp", "Two axial + five equatorial.", "Zr", 7, "pentagonal bipyramidal"),
    rare("rare-sap", "Look for a twisted square antiprism.", "La", 8, "square antiprismatic"),
  ]
}

fn builder(id: &str, prompt: &str, badge: &str, note: &str, d: u8, geometry: &str, spin: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Bonding, "builder");
  q.id = Some(id.into());
  q.prompt = prompt.into();
  q.formula = Some(prompt.into());
  q.badge = badge.into();
  q.note = note.into();
  q.d_electrons = Some(d);
  q.geometry = Some(geometry.into());
  q.spin = Some(spin.into());
  q
}

fn series(id: &str, shown: &[&str], order: &[&str]) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Bonding, "series");
  q.id = Some(id.into());
  q.prompt = "Order ligands by field strength (strong to weak).".into();
  q.ligands = strings(shown);
  q.sequence = strings(order);
  q
}

fn mo(id: &str, prompt: &str, note: &str, t2g: &str, eg: &str) -> QuestionCfg {
  let levels = strings(&["low", "mid", "high"]);
  let mut q = QuestionCfg::new(ModuleId::Bonding, "mo");
  q.id = Some(id.into());
  q.prompt = prompt.into();
  q.note = note.into();
  q.selections = BTreeMap::from([("t2g".to_string(), t2g.to_string()), ("eg".to_string(), eg.to_string())]);
  q.choices = BTreeMap::from([("t2g".to_string(), levels.clone()), ("eg".to_string(), levels)]);
  q
}

fn spectra(id: &str, prompt: &str, options: [&str; 2], answer: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Bonding, "spectra");
  q.id = Some(id.into());
  q.prompt = prompt.into();
  q.options = strings(&options);
  q.answer = Some(answer.into());
  q
}

fn bonding_seeds() -> Vec<QuestionCfg> {
  vec![
    builder("d6-octa-weak", "[Fe(H2O)6]2+", "d6 octahedral", "Weak-field ligand; determine high spin filling.", 6, "octahedral", "high"),
    builder("d6-octa-strong", "[Co(NH3)6]3+", "d6 octahedral", "Stronger field ligand; decide spin state.", 6, "octahedral", "low"),
    builder("d6-octa-weak-2", "[CoF6]3-", "d6 octahedral", "High-spin expected for weak field ligands.", 6, "octahedral", "high"),
    builder("d8-square", "[Ni(CN)4]2-", "d8 square planar", "Square planar splitting; low spin.", 8, "square planar", "low"),
    builder("d5-tetra", "[MnCl4]2-", "d5 tetrahedral", "Tetrahedral complexes are typically high spin.", 5, "tetrahedral", "high"),
    builder("d5-octa-weak", "[Mn(H2O)6]2+", "d5 octahedral", "Weak field; high spin for d5.", 5, "octahedral", "high"),
    builder("d5-octa-strong", "[Fe(CN)6]3-", "d5 octahedral", "Strong-field ligand; low spin for d5.", 5, "octahedral", "low"),
    builder("d6-octa-strong-2", "[Fe(CN)6]4-", "d6 octahedral", "Strong-field ligand; low spin for d6.", 6, "octahedral", "low"),
    series("series-1", &["I-", "CN-", "H2O", "NH3", "Cl-"], &["CN-", "NH3", "H2O", "Cl-", "I-"]),
    series("series-2", &["PPh3", "en", "F-", "CO", "NO2-"], &["CO", "PPh3", "en", "NO2-", "F-"]),
    mo(
      "mo-sigma",
      "Build the MO diagram for a sigma-donor ligand set (e.g., NH3).",
      "t2g stays nonbonding, eg is antibonding.",
      "mid",
      "high",
    ),
    mo(
      "mo-pi-donor",
      "Build the MO diagram for a pi-donor ligand set (e.g., Cl-).",
      "t2g is raised (antibonding character).",
      "high",
      "high",
    ),
    mo(
      "mo-pi-acceptor",
      "Build the MO diagram for a pi-acceptor ligand set (e.g., CN-, CO).",
      "t2g is stabilized (bonding character).",
      "low",
      "high",
    ),
    spectra("spectra-1", "Given Delta is large, which spin state is favored?", ["high spin", "low spin"], "low spin"),
    spectra(
      "spectra-2",
      "A complex absorbs at longer wavelength (lower energy). What does that imply about Delta?",
      ["small Delta", "large Delta"],
      "small delta",
    ),
    spectra("spectra-3", "Square planar d8 complexes typically show which spin state?", ["high spin", "low spin"], "low spin"),
  ]
}

fn geometric(id: &str, formula: &str, answer: &str, geometry: &str, central: &str, ligands: &[&str]) -> QuestionCfg {
  let positions: &[&str] = if ligands.len() == 4 { &SQUARE_SITES } else { &OCTAHEDRAL_SITES };
  let mut q = QuestionCfg::new(ModuleId::Isomerism, "geometric");
  q.id = Some(id.into());
  q.category = Some("cis/trans".into());
  q.formula = Some(formula.into());
  q.prompt = "Identify the isomer shown.".into();
  q.geometry = Some(geometry.into());
  q.metal = Some(central.into());
  q.sites = sites(positions, ligands);
  q.options = strings(&["cis", "trans"]);
  q.answer = Some(answer.into());
  q
}

fn optical(id: &str, formula: &str, answer: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Isomerism, "optical");
  q.id = Some(id.into());
  q.category = Some("lambda/delta".into());
  q.formula = Some(formula.into());
  q.prompt = "Identify the enantiomer shown.".into();
  q.geometry = Some("octahedral".into());
  q.options = strings(&["lambda", "delta"]);
  q.answer = Some(answer.into());
  q
}

fn structural(id: &str, pair: &str, answer: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(ModuleId::Isomerism, "structural");
  q.id = Some(id.into());
  q.category = Some("structural".into());
  q.prompt = format!("Classify the isomer pair:\n{pair}");
  q.formula = Some(pair.into());
  q.options = strings(&STRUCTURAL_KINDS);
  q.answer = Some(answer.into());
  q
}

fn isomerism_seeds() -> Vec<QuestionCfg> {
  vec![
    geometric("pt-cis", "[Pt(NH3)2Cl2]", "cis", "square planar", "Pt", &["Cl-", "NH3", "Cl-", "NH3"]),
    geometric("pt-trans", "[Pt(NH3)2Cl2]", "trans", "square planar", "Pt", &["NH3", "NH3", "Cl-", "Cl-"]),
    geometric("co-cis", "[Co(NH3)4Cl2]+", "cis", "octahedral", "Co", &["NH3", "NH3", "NH3", "Cl-", "NH3", "Cl-"]),
    geometric("co-trans", "[Co(NH3)4Cl2]+", "trans", "octahedral", "Co", &["NH3", "NH3", "NH3", "NH3", "Cl-", "Cl-"]),
    optical("lambda", "[Co(en)3]3+", "lambda"),
    optical("delta", "[Co(en)3]3+", "delta"),
    optical("lambda-ox", "[Cr(ox)3]3-", "lambda"),
    optical("delta-ox", "[Cr(ox)3]3-", "delta"),
    structural("ionization", "[Co(NH3)5Br]SO4 vs [Co(NH3)5SO4]Br", "ionization"),
    structural("linkage", "[Co(NH3)5(NO2)]Cl2 vs [Co(NH3)5(ONO)]Cl2", "linkage"),
    structural("coordination", "[Co(NH3)6][Cr(CN)6] vs [Cr(NH3)6][Co(CN)6]", "coordination"),
    structural("hydrate", "[Cr(H2O)6]Cl3 vs [Cr(H2O)5Cl]Cl2.H2O", "hydrate/solvate"),
    structural("linkage-2", "[Co(NH3)5(NCS)]Cl2 vs [Co(NH3)5(SCN)]Cl2", "linkage"),
    structural("ionization-2", "[Co(NH3)5Cl]Br2 vs [Co(NH3)5Br]Cl2", "ionization"),
  ]
}

/// Single-choice record; `tag` groups items that remediate each other.
fn choice(module: ModuleId, mode: &str, id: &str, prompt: &str, note: &str, badge: &str, options: &[&str], answer: &str, tag: &str) -> QuestionCfg {
  let mut q = QuestionCfg::new(module, mode);
  q.id = Some(id.into());
  q.prompt = prompt.into();
  q.note = note.into();
  q.badge = badge.into();
  q.options = strings(options);
  q.answer = Some(answer.into());
  q.tags = strings(&[mode, tag]);
  q
}

fn mechanism(mode: &str, id: &str, prompt: &str, note: &str, answer: &str) -> QuestionCfg {
  let badge = if mode == "rate" { "Rate law" } else { "Mechanism" };
  let tag = match answer {
    "D" => "dissociative",
    "A" => "associative",
    _ => "interchange",
  };
  choice(ModuleId::Reactions, mode, id, prompt, note, badge, &MECHANISMS, answer, tag)
}

fn stereo(id: &str, prompt: &str, answer: &str) -> QuestionCfg {
  choice(
    ModuleId::Reactions,
    "stereo",
    id,
    prompt,
    "Predict stereochemical outcome.",
    "Stereochemistry",
    &STEREO_OUTCOMES,
    answer,
    "five-coordinate",
  )
}

fn reaction_seeds() -> Vec<QuestionCfg> {
  vec![
    mechanism("rate", "rate-d", "Rate = k[ML5X]", "Entering ligand does not appear in the rate law.", "D"),
    mechanism("rate", "rate-a", "Rate = k[ML4X][Y]", "Entering ligand appears in the rate law.", "A"),
    mechanism("rate", "rate-i", "Rate = k[ML5X][Y]^0.5", "Partial dependence on entering ligand.", "I"),
    mechanism("rate", "rate-i2", "Rate = k[ML5X][Y]^0.2", "Weak dependence on entering ligand.", "I"),
    mechanism("path", "path-sp", "Square planar Pt(II) substitution with strong nucleophile.", "Predict dominant pathway.", "A"),
    mechanism("path", "path-octa", "Octahedral Co(III) complex, inert, rate independent of Y.", "Predict dominant pathway.", "D"),
    mechanism("path", "path-inter", "Octahedral complex, rate weakly depends on Y.", "Predict dominant pathway.", "I"),
    stereo("stereo-ret", "Five-coordinate intermediate retains configuration.", "retention"),
    stereo("stereo-alt", "Five-coordinate intermediate rearranges before substitution.", "alteration"),
    stereo("stereo-mix", "Both trigonal bipyramidal and square pyramidal pathways available.", "mixture"),
  ]
}

fn solid_seeds() -> Vec<QuestionCfg> {
  let cells = ["simple cubic", "body-centered cubic", "face-centered cubic"];
  let counts = ["1", "2", "4"];
  let packing = ["52%", "68%", "74%"];
  let systems = ["cubic", "tetragonal", "hexagonal", "orthorhombic"];
  let identify = "Identify the unit cell type.";
  let packing_note = "Select the closest value.";
  vec![
    choice(ModuleId::Solids, "identify", "sc", identify, "Corners only.", "Cubic", &cells, "simple cubic", "sc"),
    choice(ModuleId::Solids, "identify", "bcc", identify, "One atom in the body center.", "Cubic", &cells, "body-centered cubic", "bcc"),
    choice(ModuleId::Solids, "identify", "fcc", identify, "Atoms at face centers.", "Cubic", &cells, "face-centered cubic", "fcc"),
    choice(ModuleId::Solids, "count", "count-sc", "How many atoms per unit cell in simple cubic?", "Corners only.", "Counting", &counts, "1", "sc"),
    choice(ModuleId::Solids, "count", "count-bcc", "How many atoms per unit cell in BCC?", "Corners + one center.", "Counting", &counts, "2", "bcc"),
    choice(ModuleId::Solids, "count", "count-fcc", "How many atoms per unit cell in FCC?", "Corners + six faces.", "Counting", &counts, "4", "fcc"),
    choice(ModuleId::Solids, "packing", "pack-sc", "Packing efficiency of simple cubic?", packing_note, "Packing", &packing, "52%", "sc"),
    choice(ModuleId::Solids, "packing", "pack-bcc", "Packing efficiency of BCC?", packing_note, "Packing", &packing, "68%", "bcc"),
    choice(ModuleId::Solids, "packing", "pack-fcc", "Packing efficiency of FCC?", packing_note, "Packing", &packing, "74%", "fcc"),
    choice(
      ModuleId::Solids,
      "lattice",
      "lattice-cubic",
      "Identify the lattice system: a = b = c, alpha = beta = gamma = 90°",
      "Select the system.",
      "Systems",
      &systems,
      "cubic",
      "right-angled",
    ),
    choice(
      ModuleId::Solids,
      "lattice",
      "lattice-hex",
      "Identify the lattice system: a = b ≠ c, alpha = beta = 90°, gamma = 120°",
      "Select the system.",
      "Systems",
      &systems,
      "hexagonal",
      "a-equals-b",
    ),
    choice(
      ModuleId::Solids,
      "lattice",
      "lattice-tetra",
      "Identify the lattice system: a = b ≠ c, alpha = beta = gamma = 90°",
      "Select the system.",
      "Systems",
      &systems,
      "tetragonal",
      "a-equals-b",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::build_question;
  use crate::geometry::GeometryRegistry;
  use std::collections::HashSet;

  #[test]
  fn every_seed_builds() {
    let reg = GeometryRegistry::standard();
    for cfg in seed_questions() {
      let id = cfg.id.clone().unwrap_or_default();
      build_question(&cfg, &reg).unwrap_or_else(|e| panic!("seed {id}: {e}"));
    }
  }

  #[test]
  fn seed_ids_are_unique() {
    let seeds = seed_questions();
    let ids: HashSet<_> = seeds.iter().filter_map(|c| c.id.clone()).collect();
    assert_eq!(ids.len(), seeds.len());
  }

  #[test]
  fn every_mode_has_seed_content() {
    let seeds = seed_questions();
    for module in ModuleId::ALL {
      for mode in module.profile().modes {
        assert!(
          seeds.iter().any(|c| c.module == module && c.mode == mode.key),
          "no seeds for {module}/{}",
          mode.key
        );
      }
    }
  }

  #[test]
  fn single_choice_seeds_grade_case_insensitively() {
    use crate::grader::{grade, Submission};
    let reg = GeometryRegistry::standard();
    let seeds = seed_questions();
    let cfg = seeds.iter().find(|c| c.id.as_deref() == Some("rate-d")).unwrap();
    let q = build_question(cfg, &reg).unwrap();
    assert_eq!(q.options["answer"], vec!["D", "I", "A"]);
    assert!(q.tags.contains("dissociative"));
    assert!(grade(&q, &Submission::Text("d".into()), &reg).unwrap().correct);
    assert!(!grade(&q, &Submission::Text("A".into()), &reg).unwrap().correct);

    let cfg = seeds.iter().find(|c| c.id.as_deref() == Some("bcc")).unwrap();
    let q = build_question(cfg, &reg).unwrap();
    assert_eq!(q.module, ModuleId::Solids);
    assert!(grade(&q, &Submission::Text("Body-Centered Cubic".into()), &reg).unwrap().correct);
  }

  #[test]
  fn naming_seed_extracts_metal_symbol() {
    let seeds = naming_seeds();
    assert_eq!(seeds[1].metal.as_deref(), Some("Co"));
    assert_eq!(seeds[2].metal.as_deref(), Some("Pt"));
  }
}
