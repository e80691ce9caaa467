use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::BlockPosition;

/// An 8-bit per channel RGBA color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct BlockColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BlockColor {
    /// The reserved color of an empty slot.
    pub const EMPTY: BlockColor = BlockColor::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        BlockColor { r, g, b, a }
    }

    /// Unpacks a color stored as `r << 24 | g << 16 | b << 8 | a`.
    pub const fn from_packed(value: u32) -> Self {
        BlockColor {
            r: (value >> 24) as u8,
            g: (value >> 16) as u8,
            b: (value >> 8) as u8,
            a: value as u8,
        }
    }

    pub const fn to_packed(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.to_packed() == 0
    }
}

impl Display for BlockColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.to_packed())
    }
}

/// A single voxel. Blocks only exist as slots inside a chunk.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Block {
    pub color: BlockColor,
    /// The legacy one-byte color id.
    pub kind: u8,
}

impl Block {
    pub const EMPTY: Block = Block {
        color: BlockColor::EMPTY,
        kind: 0,
    };
    /// The kind given to a non-empty block whose color has no legacy id.
    pub const SOLID: u8 = 1;

    /// Creates a block from its color. The kind is derived from the color alone: empty is 0, an
    /// opaque grey `(k, k, k, 255)` is the legacy id `k`, anything else is [`SOLID`](Self::SOLID).
    /// This is the inverse of [`from_kind`](Self::from_kind).
    pub const fn from_color(color: BlockColor) -> Self {
        let kind = if color.is_empty() {
            0
        } else if color.a == u8::MAX && color.r == color.g && color.g == color.b && color.r != 0 {
            color.r
        } else {
            Block::SOLID
        };

        Block { color, kind }
    }

    /// Creates a block from a legacy color id. Id 0 is empty, every other id is an opaque grey.
    pub const fn from_kind(kind: u8) -> Self {
        let color = if kind == 0 {
            BlockColor::EMPTY
        } else {
            BlockColor::new(kind, kind, kind, u8::MAX)
        };

        Block { color, kind }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.color.is_empty()
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::EMPTY
    }
}

/// A location players may spawn at.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: BlockPosition,
}

impl SpawnPoint {
    pub const fn new(position: BlockPosition) -> Self {
        SpawnPoint { position }
    }
}
