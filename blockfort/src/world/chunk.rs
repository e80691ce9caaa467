use blockfort_data::{Block, LocalPosition, CHUNK_VOLUME};

/// A cube of `CHUNK_SIZE³` blocks. A chunk knows nothing about where it sits in the map.
#[derive(Clone, PartialEq, Eq)]
pub struct Chunk {
    blocks: Box<[Block]>,
}

impl Chunk {
    pub fn empty() -> Self {
        Chunk {
            blocks: vec![Block::EMPTY; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    /// Builds a chunk from blocks in local index order. Returns `None` if the count is wrong.
    pub fn from_blocks(blocks: Vec<Block>) -> Option<Self> {
        if blocks.len() != CHUNK_VOLUME {
            return None;
        }

        Some(Chunk {
            blocks: blocks.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn block(&self, pos: LocalPosition) -> Block {
        self.blocks[pos.index()]
    }

    /// All blocks in local index order.
    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub(crate) fn set_block(&mut self, pos: LocalPosition, block: Block) {
        self.blocks[pos.index()] = block;
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_empty)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_empty()).count()
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Chunk::empty()
    }
}
