use crate::config::WorldGenConfig;
use crate::utils::error::{GenError, Result};
use crate::world::biome::Biome;
use crate::world::block_id::BlockId;
use crate::world::chunk::CHUNK_HEIGHT;
use crate::world::generator::biome_gen::{CheckerboardBiomeGen, ConstantBiomeGen, NoiseBiomeGen};
use crate::world::generator::composition::{BiomalCompositionGen, FlatCompositionGen};
use crate::world::generator::finishers::{BottomLavaFinisher, SnowFinisher, TallGrassFinisher};
use crate::world::generator::height_gen::{FlatHeightGen, NoiseHeightGen};
use crate::world::generator::strategy::{
    BiomeStrategy, CompositionStrategy, FinisherStrategy, HeightStrategy, Pipeline,
    StructureStrategy,
};
use crate::world::generator::structures::{CaveGen, OreVeinGen, TreeGen};
use std::sync::Arc;

/// Resolves the configured strategy names into a pipeline. Any unknown name
/// or out-of-range parameter is fatal; nothing is built in that case.
pub fn build_pipeline(config: &WorldGenConfig) -> Result<Pipeline> {
    validate(config)?;
    let seed = config.seed;

    let biome: Arc<dyn BiomeStrategy> = match config.biome_gen.as_str() {
        "constant" => {
            let biome = Biome::by_name(&config.constant_biome)
                .ok_or_else(|| GenError::UnknownBiome(config.constant_biome.clone()))?;
            Arc::new(ConstantBiomeGen::new(biome))
        }
        "checkerboard" => Arc::new(CheckerboardBiomeGen::new()),
        "noise" => Arc::new(NoiseBiomeGen::new(seed, config.world_scale)),
        other => return Err(GenError::UnknownBiomeGen(other.to_string())),
    };

    let height: Box<dyn HeightStrategy> = match config.height_gen.as_str() {
        "flat" => Box::new(FlatHeightGen::new(config.flat_height)),
        "noise" => Box::new(NoiseHeightGen::new(
            seed,
            Arc::clone(&biome),
            config.terrain_amplitude,
            config.world_scale,
            config.sea_level,
        )),
        other => return Err(GenError::UnknownHeightGen(other.to_string())),
    };

    let composition: Box<dyn CompositionStrategy> = match config.composition_gen.as_str() {
        "flat" => {
            let mut layers = Vec::with_capacity(config.flat_layers.len());
            for layer in &config.flat_layers {
                let block = BlockId::by_name(&layer.block)
                    .ok_or_else(|| GenError::UnknownBlock(layer.block.clone()))?;
                layers.push((block, layer.thickness));
            }
            Box::new(FlatCompositionGen::new(layers))
        }
        "biomal" => Box::new(BiomalCompositionGen::new(
            Arc::clone(&biome),
            config.sea_level,
        )),
        other => return Err(GenError::UnknownCompositionGen(other.to_string())),
    };

    let mut pipeline = Pipeline::new(biome, height, composition);

    for name in &config.structure_gens {
        let structure: Box<dyn StructureStrategy> = match name.as_str() {
            "caves" => Box::new(CaveGen::new(seed, config.cave_threshold, config.world_scale)),
            "ores" => Box::new(OreVeinGen::new(
                seed,
                config.ore_attempts,
                config.sea_level - 8,
            )),
            "trees" => Box::new(TreeGen::new(
                seed,
                Arc::clone(pipeline.biome_gen()),
                config.tree_chance,
            )),
            other => return Err(GenError::UnknownStructureGen(other.to_string())),
        };
        pipeline = pipeline.with_structure(structure);
    }

    for name in &config.finish_gens {
        let finisher: Box<dyn FinisherStrategy> = match name.as_str() {
            "snow" => Box::new(SnowFinisher::new()),
            "tall_grass" => Box::new(TallGrassFinisher::new(seed, config.foliage_chance)),
            "bottom_lava" => Box::new(BottomLavaFinisher::new(config.bottom_lava_level)),
            other => return Err(GenError::UnknownFinisher(other.to_string())),
        };
        pipeline = pipeline.with_finisher(finisher);
    }

    Ok(pipeline)
}

fn validate(config: &WorldGenConfig) -> Result<()> {
    if config.world_scale <= 0.0 {
        return Err(GenError::InvalidParameter(format!(
            "world_scale must be positive, got {}",
            config.world_scale
        )));
    }
    if config.cave_threshold <= 0.0 {
        return Err(GenError::InvalidParameter(format!(
            "cave_threshold must be positive, got {}",
            config.cave_threshold
        )));
    }
    if config.tree_chance == 0 {
        return Err(GenError::InvalidParameter(
            "tree_chance must be at least 1".into(),
        ));
    }
    if config.foliage_chance == 0 {
        return Err(GenError::InvalidParameter(
            "foliage_chance must be at least 1".into(),
        ));
    }
    if !(1..CHUNK_HEIGHT as i32).contains(&config.sea_level) {
        return Err(GenError::InvalidParameter(format!(
            "sea_level must be within the chunk volume, got {}",
            config.sea_level
        )));
    }
    if !(0..CHUNK_HEIGHT as i32).contains(&config.flat_height) {
        return Err(GenError::InvalidParameter(format!(
            "flat_height must be within the chunk volume, got {}",
            config.flat_height
        )));
    }
    Ok(())
}
