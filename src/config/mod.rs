pub mod worldgen;

pub use worldgen::{FlatLayer, WorldGenConfig};
