//! Plain data types shared by the map store and everything that consumes it.

/// Block colors and the block value stored in chunks.
pub mod block;
/// Global, chunk and local coordinates plus the six axis directions.
pub mod location;

pub use block::{Block, BlockColor, SpawnPoint};
pub use location::{BlockPosition, ChunkPosition, Direction, LocalPosition};

/// The edge length of a cubic chunk, in blocks.
pub const CHUNK_SIZE: usize = 16;
/// The number of blocks in one layer of a chunk.
pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;
/// The number of blocks in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_AREA * CHUNK_SIZE;
