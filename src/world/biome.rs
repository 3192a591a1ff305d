use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Plains,
    Mountains,
    Desert,
    Forest,
    Ocean,
    Tundra,
    Swamp,
}

impl Biome {
    pub const ALL: [Biome; 7] = [
        Biome::Plains,
        Biome::Mountains,
        Biome::Desert,
        Biome::Forest,
        Biome::Ocean,
        Biome::Tundra,
        Biome::Swamp,
    ];

    /// Parses a config name into a biome.
    pub fn by_name(name: &str) -> Option<Biome> {
        match name {
            "plains" => Some(Biome::Plains),
            "mountains" => Some(Biome::Mountains),
            "desert" => Some(Biome::Desert),
            "forest" => Some(Biome::Forest),
            "ocean" => Some(Biome::Ocean),
            "tundra" => Some(Biome::Tundra),
            "swamp" => Some(Biome::Swamp),
            _ => None,
        }
    }
}
