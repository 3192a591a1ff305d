use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric block type stored per voxel in a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const DIRT: BlockId = BlockId(2);
    pub const GRASS: BlockId = BlockId(3);
    pub const SAND: BlockId = BlockId(4);
    pub const GRAVEL: BlockId = BlockId(5);
    pub const WATER: BlockId = BlockId(6);
    pub const LAVA: BlockId = BlockId(7);
    pub const BEDROCK: BlockId = BlockId(8);
    pub const SNOW_LAYER: BlockId = BlockId(9);
    pub const LOG: BlockId = BlockId(10);
    pub const LEAVES: BlockId = BlockId(11);
    pub const TALL_GRASS: BlockId = BlockId(12);
    pub const COAL_ORE: BlockId = BlockId(13);
    pub const IRON_ORE: BlockId = BlockId(14);
    pub const GOLD_ORE: BlockId = BlockId(15);
    pub const DIAMOND_ORE: BlockId = BlockId(16);

    /// Looks up a block by its config name.
    pub fn by_name(name: &str) -> Option<BlockId> {
        BLOCKS.get(name).copied()
    }

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }

    /// Solid blocks are the ones a height map counts as terrain surface.
    pub fn is_solid(self) -> bool {
        !matches!(
            self,
            Self::AIR | Self::WATER | Self::LAVA | Self::SNOW_LAYER | Self::TALL_GRASS
        )
    }
}

static BLOCKS: Lazy<HashMap<&'static str, BlockId>> = Lazy::new(|| {
    HashMap::from([
        ("air", BlockId::AIR),
        ("stone", BlockId::STONE),
        ("dirt", BlockId::DIRT),
        ("grass", BlockId::GRASS),
        ("sand", BlockId::SAND),
        ("gravel", BlockId::GRAVEL),
        ("water", BlockId::WATER),
        ("lava", BlockId::LAVA),
        ("bedrock", BlockId::BEDROCK),
        ("snow_layer", BlockId::SNOW_LAYER),
        ("log", BlockId::LOG),
        ("leaves", BlockId::LEAVES),
        ("tall_grass", BlockId::TALL_GRASS),
        ("coal_ore", BlockId::COAL_ORE),
        ("iron_ore", BlockId::IRON_ORE),
        ("gold_ore", BlockId::GOLD_ORE),
        ("diamond_ore", BlockId::DIAMOND_ORE),
    ])
});
