pub mod adjacency;
pub mod area;
mod chunk;
/// Native map files and the VXL importer.
pub mod codec;
mod error;
pub mod liquid;
mod map;
mod provider;
mod updater;

pub use adjacency::{ChunkAdjacency, ChunkNeighbors};
pub use chunk::Chunk;
pub use error::*;
pub use liquid::{WorldGenerator, DEFAULT_LIQUID_COLOR};
pub use map::*;
pub use provider::MapProvider;
pub use updater::*;
