//! Scenario files describing the board, the deployments and optional extras.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use skirmish_core::{Cell, TerrainRect};
use skirmish_registry::UnitRegistry;
use skirmish_world::{BattleSetup, Deployment};

/// Scenario used when no file is given on the command line.
pub(crate) const BUILTIN_SCENARIO: &str = r#"
seed = 7
turns = 12

[[terrain]]
from = [1, 2]
to = [2, 3]
terrain = "forest"

[[terrain]]
from = [3, 5]
to = [4, 5]
terrain = "mountain"

[[terrain]]
from = [0, 4]
to = [1, 4]
terrain = "water"

[[terrain]]
from = [5, 0]
to = [5, 0]
terrain = "wall"

[[allies]]
name = "Rowan"
position = [4, 0]

[[allies]]
name = "Sela"
position = [5, 1]

[[allies]]
name = "Garron"
position = [3, 1]

[[allies]]
name = "Mira"
position = [4, 2]

[[allies]]
name = "Ives"
position = [5, 2]

[[foes]]
name = "Brigand"
position = [0, 7]

[[foes]]
name = "Lancer"
position = [1, 6]

[[foes]]
name = "Hexer"
position = [0, 6]

[[foes]]
name = "Wyvern"
position = [2, 7]

[[foes]]
name = "Sentinel"
position = [1, 7]
"#;

/// Parsed scenario document.
///
/// Extra unit templates may appear in the same document as `[[unit]]`
/// tables; they are read by the registry, not by this type.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct Scenario {
    /// Seed for the CPU controllers.
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Maximum number of turns to play.
    #[serde(default)]
    pub(crate) turns: Option<u32>,
    #[serde(default)]
    terrain: Vec<TerrainEntry>,
    #[serde(default)]
    allies: Vec<DeploymentEntry>,
    #[serde(default)]
    foes: Vec<DeploymentEntry>,
}

#[derive(Clone, Debug, Deserialize)]
struct TerrainEntry {
    from: [i32; 2],
    to: [i32; 2],
    terrain: String,
}

#[derive(Clone, Debug, Deserialize)]
struct DeploymentEntry {
    name: String,
    position: [i32; 2],
}

/// Scenario together with the registry its deployments draw from.
#[derive(Debug)]
pub(crate) struct LoadedScenario {
    pub(crate) scenario: Scenario,
    pub(crate) registry: UnitRegistry,
}

impl Scenario {
    /// Battle setup handed to the world.
    pub(crate) fn setup(&self) -> BattleSetup {
        BattleSetup {
            terrain: self
                .terrain
                .iter()
                .map(|entry| {
                    TerrainRect::new(cell(entry.from), cell(entry.to), entry.terrain.clone())
                })
                .collect(),
            allies: deployments(&self.allies),
            foes: deployments(&self.foes),
        }
    }
}

/// Parses a scenario document and layers its templates over the built-in cast.
pub(crate) fn parse(source: &str) -> Result<LoadedScenario> {
    let scenario: Scenario = toml::from_str(source).context("invalid scenario document")?;
    let mut registry = UnitRegistry::builtin();
    let _ = registry
        .load_toml_str(source)
        .context("invalid unit templates in scenario")?;
    Ok(LoadedScenario { scenario, registry })
}

/// Reads the scenario at `path`, or the built-in one when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<LoadedScenario> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            parse(&source).with_context(|| format!("failed to load scenario {}", path.display()))
        }
        None => parse(BUILTIN_SCENARIO),
    }
}

fn cell([row, column]: [i32; 2]) -> Cell {
    Cell::new(row, column)
}

fn deployments(entries: &[DeploymentEntry]) -> Vec<Deployment> {
    entries
        .iter()
        .map(|entry| Deployment::new(entry.name.clone(), cell(entry.position)))
        .collect()
}
