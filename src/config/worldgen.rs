use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One layer of a flat world, bottom-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatLayer {
    pub block: String,
    pub thickness: u32,
}

/// Selects and parameterizes the generation pipeline for a world.
///
/// Strategies are selected by name; unknown names fail pipeline construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    pub seed: i64,

    // Strategy selection
    pub biome_gen: String,
    pub height_gen: String,
    pub composition_gen: String,
    pub structure_gens: Vec<String>,
    pub finish_gens: Vec<String>,

    // Strategy parameters
    pub constant_biome: String,
    pub flat_height: i32,
    pub flat_layers: Vec<FlatLayer>,
    pub terrain_amplitude: f64,
    pub world_scale: f64,
    pub sea_level: i32,
    pub cave_threshold: f64,
    pub ore_attempts: u32,
    pub tree_chance: u32,
    pub foliage_chance: u32,
    pub bottom_lava_level: i32,

    // Queue policy
    pub queue_skip_limit: usize,
    pub queue_warn_limit: usize,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            biome_gen: "noise".into(),
            height_gen: "noise".into(),
            composition_gen: "biomal".into(),
            structure_gens: vec!["caves".into(), "ores".into(), "trees".into()],
            finish_gens: vec!["snow".into(), "tall_grass".into(), "bottom_lava".into()],
            constant_biome: "plains".into(),
            flat_height: 64,
            flat_layers: vec![
                FlatLayer {
                    block: "bedrock".into(),
                    thickness: 1,
                },
                FlatLayer {
                    block: "dirt".into(),
                    thickness: 3,
                },
                FlatLayer {
                    block: "grass".into(),
                    thickness: 1,
                },
            ],
            terrain_amplitude: 32.0,
            world_scale: 0.01,
            sea_level: 64,
            cave_threshold: 0.7,
            ore_attempts: 24,
            tree_chance: 40,
            foliage_chance: 12,
            bottom_lava_level: 10,
            queue_skip_limit: 500,
            queue_warn_limit: 1000,
        }
    }
}

impl WorldGenConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
