use crate::world::chunk::CHUNK_SIZE;
use glam::IVec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Identifies one chunk column in the world grid. Chunk identity is the
/// (x, z) pair; the vertical axis is covered by the chunk itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkCoord(pub IVec2);

impl Serialize for ChunkCoord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (self.0.x, self.0.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkCoord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (x, z) = <(i32, i32)>::deserialize(deserializer)?;
        Ok(ChunkCoord(IVec2::new(x, z)))
    }
}

impl PartialOrd for ChunkCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.0.x.cmp(&other.0.x) {
            Ordering::Equal => self.0.y.cmp(&other.0.y),
            ord => ord,
        }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0.x, self.0.y)
    }
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self(IVec2::new(x, z))
    }

    /// Chunk containing the given world block position.
    pub fn from_block_pos(world_x: i32, world_z: i32) -> Self {
        Self::new(
            world_x.div_euclid(CHUNK_SIZE as i32),
            world_z.div_euclid(CHUNK_SIZE as i32),
        )
    }

    pub fn x(&self) -> i32 {
        self.0.x
    }

    pub fn z(&self) -> i32 {
        self.0.y
    }

    /// World X of this chunk's origin corner.
    pub fn block_x(&self) -> i32 {
        self.0.x * CHUNK_SIZE as i32
    }

    /// World Z of this chunk's origin corner.
    pub fn block_z(&self) -> i32 {
        self.0.y * CHUNK_SIZE as i32
    }

    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self(self.0 + IVec2::new(dx, dz))
    }
}

impl From<IVec2> for ChunkCoord {
    fn from(vec: IVec2) -> Self {
        Self(vec)
    }
}

impl From<ChunkCoord> for IVec2 {
    fn from(coord: ChunkCoord) -> Self {
        coord.0
    }
}
