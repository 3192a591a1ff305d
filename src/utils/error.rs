use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Unknown biome generator: {0}")]
    UnknownBiomeGen(String),

    #[error("Unknown height generator: {0}")]
    UnknownHeightGen(String),

    #[error("Unknown composition generator: {0}")]
    UnknownCompositionGen(String),

    #[error("Unknown structure generator: {0}")]
    UnknownStructureGen(String),

    #[error("Unknown finisher: {0}")]
    UnknownFinisher(String),

    #[error("Unknown biome: {0}")]
    UnknownBiome(String),

    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Invalid generator parameter: {0}")]
    InvalidParameter(String),

    #[error("{stage} failed for chunk ({x}, {z}): {message}")]
    StrategyFault {
        stage: &'static str,
        x: i32,
        z: i32,
        message: String,
    },

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;
