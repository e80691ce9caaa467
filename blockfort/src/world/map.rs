use crate::world::{Chunk, MapError};
use blockfort_data::{Block, BlockPosition, ChunkPosition, LocalPosition, SpawnPoint, CHUNK_SIZE};

/// Width of a freshly generated map, in blocks.
pub const DEFAULT_WIDTH: i32 = 512;
/// Height of a freshly generated map, in blocks.
pub const DEFAULT_HEIGHT: i32 = 64;
/// Depth of a freshly generated map, in blocks.
pub const DEFAULT_DEPTH: i32 = 512;

const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// The whole voxel world: its dimensions, every chunk, and the spawn points.
///
/// Chunks are stored so that chunk `(cx, cy, cz)` lives at index
/// `cz + cy * chunks_z + cx * chunks_y * chunks_z`, Z varying fastest. The codecs and the chunk
/// adjacency table rely on this exact order.
///
/// A position is *contained* if it addresses storage at all, and *valid* if gameplay may touch it.
/// The two differ only on the ground layer `y = 0`, which is storage but never valid.
pub struct MapData {
    width: i32,
    height: i32,
    depth: i32,
    chunks: Box<[Chunk]>,
    spawn_points: Vec<SpawnPoint>,
}

impl MapData {
    /// Allocates a map of empty chunks.
    pub fn new(width: i32, height: i32, depth: i32) -> Result<Self, MapError> {
        let count = Self::checked_chunk_count(width, height, depth)?;
        let mut chunks = Vec::with_capacity(count);
        chunks.resize_with(count, Chunk::empty);

        Ok(MapData {
            width,
            height,
            depth,
            chunks: chunks.into_boxed_slice(),
            spawn_points: Vec::new(),
        })
    }

    /// Assembles a map from chunks already in index order.
    pub fn from_chunks(
        width: i32,
        height: i32,
        depth: i32,
        chunks: Vec<Chunk>,
        spawn_points: Vec<SpawnPoint>,
    ) -> Result<Self, MapError> {
        let count = Self::checked_chunk_count(width, height, depth)?;
        if chunks.len() != count {
            return Err(MapError::InvalidFormat(format!(
                "expected {} chunks for a {}x{}x{} map but got {}",
                count,
                width,
                height,
                depth,
                chunks.len()
            )));
        }

        Ok(MapData {
            width,
            height,
            depth,
            chunks: chunks.into_boxed_slice(),
            spawn_points,
        })
    }

    pub(crate) fn checked_chunk_count(width: i32, height: i32, depth: i32) -> Result<usize, MapError> {
        let valid = |dim: i32| dim > 0 && dim % CHUNK_SIZE_I32 == 0;

        if !(valid(width) && valid(height) && valid(depth)) {
            return Err(MapError::InvalidDimensions {
                width,
                height,
                depth,
            });
        }

        ((width / CHUNK_SIZE_I32) as usize)
            .checked_mul((height / CHUNK_SIZE_I32) as usize)
            .and_then(|count| count.checked_mul((depth / CHUNK_SIZE_I32) as usize))
            .ok_or(MapError::InvalidDimensions {
                width,
                height,
                depth,
            })
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    #[inline]
    pub fn chunks_x(&self) -> usize {
        (self.width / CHUNK_SIZE_I32) as usize
    }

    #[inline]
    pub fn chunks_y(&self) -> usize {
        (self.height / CHUNK_SIZE_I32) as usize
    }

    #[inline]
    pub fn chunks_z(&self) -> usize {
        (self.depth / CHUNK_SIZE_I32) as usize
    }

    /// The number of chunks implied by the dimensions. Always equal to the stored chunk count.
    pub fn chunk_count(&self) -> usize {
        self.chunks_x() * self.chunks_y() * self.chunks_z()
    }

    /// The index of a chunk given its chunk coordinate. The coordinate must lie in the chunk grid.
    #[inline]
    pub fn chunk_index(&self, chunk: ChunkPosition) -> usize {
        let z_stride = self.chunks_z();
        let x_stride = self.chunks_y() * z_stride;
        chunk.z as usize + chunk.y as usize * z_stride + chunk.x as usize * x_stride
    }

    /// The inverse of [`chunk_index`](Self::chunk_index).
    pub fn chunk_position(&self, index: usize) -> ChunkPosition {
        let z_stride = self.chunks_z();
        let x_stride = self.chunks_y() * z_stride;
        ChunkPosition::new(
            (index / x_stride) as i32,
            ((index % x_stride) / z_stride) as i32,
            (index % z_stride) as i32,
        )
    }

    /// Whether a position addresses stored data, ground layer included.
    #[inline]
    pub fn contains(&self, pos: BlockPosition) -> bool {
        pos.x >= 0
            && pos.x < self.width
            && pos.y >= 0
            && pos.y < self.height
            && pos.z >= 0
            && pos.z < self.depth
    }

    /// Whether gameplay may read or write a position. The ground layer `y = 0` is never valid.
    #[inline]
    pub fn is_valid(&self, pos: BlockPosition) -> bool {
        self.contains(pos) && pos.y > 0
    }

    pub fn chunk_index_of(&self, pos: BlockPosition) -> Result<usize, MapError> {
        self.check(pos)?;
        Ok(self.chunk_index(pos.chunk()))
    }

    pub fn local_position_of(&self, pos: BlockPosition) -> Result<LocalPosition, MapError> {
        self.check(pos)?;
        Ok(pos.local())
    }

    pub fn local_index_of(&self, pos: BlockPosition) -> Result<usize, MapError> {
        self.local_position_of(pos).map(|local| local.index())
    }

    pub fn block(&self, pos: BlockPosition) -> Result<Block, MapError> {
        self.check(pos)?;
        Ok(self.chunks[self.chunk_index(pos.chunk())].block(pos.local()))
    }

    pub(crate) fn set_block(&mut self, pos: BlockPosition, block: Block) -> Result<(), MapError> {
        self.check(pos)?;
        let index = self.chunk_index(pos.chunk());
        self.chunks[index].set_block(pos.local(), block);
        Ok(())
    }

    /// Reads any stored cell, ground layer included, bypassing the gameplay validity rule.
    pub(crate) fn stored_block(&self, pos: BlockPosition) -> Option<Block> {
        if !self.contains(pos) {
            return None;
        }

        Some(self.chunks[self.chunk_index(pos.chunk())].block(pos.local()))
    }

    pub(crate) fn set_stored_block(&mut self, pos: BlockPosition, block: Block) -> bool {
        if !self.contains(pos) {
            return false;
        }

        let index = self.chunk_index(pos.chunk());
        self.chunks[index].set_block(pos.local(), block);
        true
    }

    #[inline]
    fn check(&self, pos: BlockPosition) -> Result<(), MapError> {
        if self.is_valid(pos) {
            Ok(())
        } else {
            Err(MapError::OutOfRange(pos))
        }
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// All chunks in index order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    pub(crate) fn spawn_points_mut(&mut self) -> &mut Vec<SpawnPoint> {
        &mut self.spawn_points
    }
}
