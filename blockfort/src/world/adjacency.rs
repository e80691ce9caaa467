use crate::world::MapData;
use blockfort_data::{ChunkPosition, Direction};

/// The up to six face neighbors of a chunk, indexed by [`Direction::ordinal`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ChunkNeighbors([Option<usize>; 6]);

impl ChunkNeighbors {
    #[inline]
    pub fn get(&self, direction: Direction) -> Option<usize> {
        self.0[direction.ordinal()]
    }

    /// Iterates over the neighbors that exist.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.get(direction).map(|index| (direction, index)))
    }
}

/// A lookup table from chunk index to neighboring chunk indices, used by the mesh builder to cull
/// faces across chunk borders. It is derived once after a map is built and owns no chunks.
pub struct ChunkAdjacency {
    neighbors: Box<[ChunkNeighbors]>,
}

impl ChunkAdjacency {
    pub fn new(map: &MapData) -> Self {
        let dims = [map.chunks_x(), map.chunks_y(), map.chunks_z()];

        let neighbors = (0 .. map.chunk_count())
            .map(|index| {
                let origin = map.chunk_position(index);
                let mut links = [None; 6];

                for direction in Direction::ALL {
                    let next = step(origin, direction);
                    let inside = [next.x, next.y, next.z]
                        .iter()
                        .zip(dims.iter())
                        .all(|(&coord, &len)| coord >= 0 && (coord as usize) < len);

                    if inside {
                        links[direction.ordinal()] = Some(map.chunk_index(next));
                    }
                }

                ChunkNeighbors(links)
            })
            .collect();

        ChunkAdjacency { neighbors }
    }

    pub fn neighbors(&self, index: usize) -> Option<&ChunkNeighbors> {
        self.neighbors.get(index)
    }

    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        self.neighbors.get(index)?.get(direction)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

fn step(mut pos: ChunkPosition, direction: Direction) -> ChunkPosition {
    match direction {
        Direction::PosX => pos.x += 1,
        Direction::NegX => pos.x -= 1,
        Direction::PosY => pos.y += 1,
        Direction::NegY => pos.y -= 1,
        Direction::PosZ => pos.z += 1,
        Direction::NegZ => pos.z -= 1,
    }
    pos
}
