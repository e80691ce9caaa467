use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};

use crate::{CHUNK_AREA, CHUNK_SIZE};

/// A global block coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockPosition { x, y, z }
    }

    /// Returns the block containing the given continuous world position.
    pub fn floor(x: f32, y: f32, z: f32) -> Self {
        BlockPosition {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }

    /// The position of the chunk containing this block. Only meaningful for non-negative
    /// coordinates, callers are expected to bounds check first.
    pub const fn chunk(&self) -> ChunkPosition {
        let size = CHUNK_SIZE as i32;
        ChunkPosition {
            x: self.x / size,
            y: self.y / size,
            z: self.z / size,
        }
    }

    /// The position of this block inside its chunk. Same caveat as [`chunk`](Self::chunk).
    pub const fn local(&self) -> LocalPosition {
        let size = CHUNK_SIZE as i32;
        LocalPosition {
            x: (self.x % size) as usize,
            y: (self.y % size) as usize,
            z: (self.z % size) as usize,
        }
    }

    pub const fn offset(mut self, direction: Direction) -> BlockPosition {
        match direction {
            Direction::PosX => self.x += 1,
            Direction::NegX => self.x -= 1,
            Direction::PosY => self.y += 1,
            Direction::NegY => self.y -= 1,
            Direction::PosZ => self.z += 1,
            Direction::NegZ => self.z -= 1,
        }
        self
    }

    /// The squared euclidean distance between two positions, saturating at `i64::MAX` for points
    /// at opposite ends of the coordinate range.
    pub fn distance_squared(&self, other: &BlockPosition) -> i64 {
        let square = |a: i32, b: i32| {
            let d = i64::from(a) - i64::from(b);
            d.saturating_mul(d)
        };

        square(self.x, other.x)
            .saturating_add(square(self.y, other.y))
            .saturating_add(square(self.z, other.z))
    }
}

impl Display for BlockPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "x: {}, y: {}, z: {}", self.x, self.y, self.z)
    }
}

impl Debug for BlockPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for BlockPosition {
    type Output = BlockPosition;

    fn add(self, rhs: Self) -> Self::Output {
        BlockPosition {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for BlockPosition {
    type Output = BlockPosition;

    fn sub(self, rhs: Self) -> Self::Output {
        BlockPosition {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// The coordinate of a chunk in the chunk grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkPosition {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkPosition { x, y, z }
    }

    /// The global position of this chunk's first block.
    pub const fn origin(&self) -> BlockPosition {
        let size = CHUNK_SIZE as i32;
        BlockPosition::new(self.x * size, self.y * size, self.z * size)
    }
}

impl Debug for ChunkPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "C({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A coordinate inside a single chunk, each component in `0 .. CHUNK_SIZE`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LocalPosition {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl LocalPosition {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        LocalPosition { x, y, z }
    }

    /// The slot of this position in a chunk's block array. X is the slowest axis, then Y, then Z.
    #[inline]
    pub const fn index(&self) -> usize {
        self.x * CHUNK_AREA + self.y * CHUNK_SIZE + self.z
    }

    pub const fn from_index(index: usize) -> Self {
        LocalPosition {
            x: index / CHUNK_AREA,
            y: (index / CHUNK_SIZE) % CHUNK_SIZE,
            z: index % CHUNK_SIZE,
        }
    }
}

/// One of the six axis-aligned directions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::PosX => Direction::NegX,
            Direction::NegX => Direction::PosX,
            Direction::PosY => Direction::NegY,
            Direction::NegY => Direction::PosY,
            Direction::PosZ => Direction::NegZ,
            Direction::NegZ => Direction::PosZ,
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    pub const fn ordinal(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_index_is_x_major() {
        assert_eq!(LocalPosition::new(0, 0, 1).index(), 1);
        assert_eq!(LocalPosition::new(0, 1, 0).index(), CHUNK_SIZE);
        assert_eq!(LocalPosition::new(1, 0, 0).index(), CHUNK_AREA);

        for index in [0, 17, 255, 256, 4095] {
            assert_eq!(LocalPosition::from_index(index).index(), index);
        }
    }

    #[test]
    fn block_position_splits_into_chunk_and_local() {
        let pos = BlockPosition::new(37, 5, 16);
        assert_eq!(pos.chunk(), ChunkPosition::new(2, 0, 1));
        assert_eq!(pos.local(), LocalPosition::new(5, 5, 0));
        assert_eq!(
            pos.chunk().origin() + BlockPosition::new(5, 5, 0),
            pos,
            "Chunk origin plus local offset should give back the global position."
        );
    }

    #[test]
    fn floor_rounds_towards_negative_infinity() {
        assert_eq!(BlockPosition::floor(1.9, 0.2, -0.5), BlockPosition::new(1, 0, -1));
    }

    #[test]
    fn distances_at_the_edge_of_the_range() {
        let origin = BlockPosition::new(0, 0, 0);
        assert_eq!(BlockPosition::new(3, -4, 0).distance_squared(&origin), 25);

        let far = BlockPosition::new(i32::MAX, 1, 1);
        assert_eq!(far.distance_squared(&far), 0);
        assert_eq!(
            far.distance_squared(&BlockPosition::new(i32::MAX - 2, 1, 1)),
            4
        );
        assert_eq!(
            BlockPosition::new(i32::MIN, i32::MIN, i32::MIN)
                .distance_squared(&BlockPosition::new(i32::MAX, i32::MAX, i32::MAX)),
            i64::MAX
        );
    }

    #[test]
    fn opposite_directions() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            let pos = BlockPosition::new(3, 3, 3);
            assert_eq!(pos.offset(direction).offset(direction.opposite()), pos);
        }
    }
}
