use crate::world::{Chunk, MapData, MapError};
use blockfort_data::{Block, BlockPosition, LocalPosition, SpawnPoint};

/// Read-only access to a map.
///
/// Rendering and area queries address many coordinates at once, so the index helpers are exposed
/// here as well as the plain block lookup.
pub struct MapProvider {
    map: MapData,
}

impl MapProvider {
    pub fn new(map: MapData) -> Self {
        MapProvider { map }
    }

    pub fn map_data(&self) -> &MapData {
        &self.map
    }

    pub(crate) fn map_data_mut(&mut self) -> &mut MapData {
        &mut self.map
    }

    pub fn into_inner(self) -> MapData {
        self.map
    }

    /// The block at a global position, or `OutOfRange` if the position is not valid.
    #[inline]
    pub fn block_at(&self, pos: BlockPosition) -> Result<Block, MapError> {
        self.map.block(pos)
    }

    #[inline]
    pub fn chunk_index_of(&self, pos: BlockPosition) -> Result<usize, MapError> {
        self.map.chunk_index_of(pos)
    }

    #[inline]
    pub fn local_position_of(&self, pos: BlockPosition) -> Result<LocalPosition, MapError> {
        self.map.local_position_of(pos)
    }

    #[inline]
    pub fn is_valid(&self, pos: BlockPosition) -> bool {
        self.map.is_valid(pos)
    }

    pub fn chunk_count(&self) -> usize {
        self.map.chunk_count()
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.map.chunk(index)
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        self.map.spawn_points()
    }
}
