use crate::world::{MapData, MapError, DEFAULT_DEPTH, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use blockfort_data::{Block, BlockColor, BlockPosition};
use log::{debug, info};

/// The liquid used when the map does not author one on its ground layer.
pub const DEFAULT_LIQUID_COLOR: BlockColor = BlockColor::new(9, 20, 60, 255);

/// Builds fresh maps.
pub struct WorldGenerator;

impl WorldGenerator {
    /// An empty map of the given size with its ground layer flooded.
    pub fn generate(width: i32, height: i32, depth: i32) -> Result<MapData, MapError> {
        let mut map = MapData::new(width, height, depth)?;
        let filled = fill_liquid(&mut map);
        info!(
            "Generated a {}x{}x{} map ({} chunks, {} liquid cells)",
            width,
            height,
            depth,
            map.chunk_count(),
            filled
        );
        Ok(map)
    }

    pub fn generate_default() -> Result<MapData, MapError> {
        Self::generate(DEFAULT_WIDTH, DEFAULT_HEIGHT, DEFAULT_DEPTH)
    }
}

/// Finds the liquid color authored on the ground layer: the last non-empty ground cell in an
/// x-major sweep, or [`DEFAULT_LIQUID_COLOR`] if the ground layer is bare.
pub fn liquid_color(map: &MapData) -> BlockColor {
    let mut color = BlockColor::EMPTY;

    for x in 0 .. map.width() {
        for z in 0 .. map.depth() {
            if let Some(block) = map.stored_block(BlockPosition::new(x, 0, z)) {
                if !block.is_empty() {
                    color = block.color;
                }
            }
        }
    }

    if color.is_empty() {
        DEFAULT_LIQUID_COLOR
    } else {
        color
    }
}

/// Floods every empty ground cell with the map's liquid color and returns how many were filled.
/// Authored ground cells are left alone, so running this twice changes nothing the second time.
pub fn fill_liquid(map: &mut MapData) -> usize {
    let liquid = Block::from_color(liquid_color(map));
    let mut filled = 0;

    for x in 0 .. map.width() {
        for z in 0 .. map.depth() {
            let pos = BlockPosition::new(x, 0, z);
            let empty = map.stored_block(pos).map_or(false, |block| block.is_empty());
            if empty && map.set_stored_block(pos, liquid) {
                filled += 1;
            }
        }
    }

    debug!("Liquid fill with {} covered {} cells", liquid.color, filled);
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground_at(map: &MapData, x: i32, z: i32) -> Option<Block> {
        map.stored_block(BlockPosition::new(x, 0, z))
    }

    fn ground(map: &MapData) -> Vec<Block> {
        let mut cells = Vec::new();
        for x in 0 .. map.width() {
            for z in 0 .. map.depth() {
                cells.push(ground_at(map, x, z).unwrap());
            }
        }
        cells
    }

    #[test]
    fn empty_map_gets_default_liquid() {
        let mut map = MapData::new(32, 32, 32).unwrap();
        assert_eq!(fill_liquid(&mut map), 32 * 32);
        assert!(ground(&map)
            .iter()
            .all(|block| block.color == BlockColor::new(9, 20, 60, 255)));

        // Nothing above the ground layer is touched
        assert!(map.block(BlockPosition::new(0, 1, 0)).unwrap().is_empty());
    }

    #[test]
    fn authored_liquid_is_reused() {
        let mut map = MapData::new(16, 16, 16).unwrap();
        let authored = Block::from_color(BlockColor::new(40, 90, 30, 255));
        let stone = Block::from_kind(120);
        map.set_stored_block(BlockPosition::new(2, 0, 2), stone);
        map.set_stored_block(BlockPosition::new(15, 0, 15), authored);

        fill_liquid(&mut map);

        assert_eq!(ground_at(&map, 2, 2), Some(stone));
        assert_eq!(ground_at(&map, 0, 0).unwrap().color, authored.color);
        assert_eq!(ground_at(&map, 9, 4).unwrap().color, authored.color);
    }

    #[test]
    fn fill_is_idempotent() {
        let mut map = MapData::new(32, 16, 16).unwrap();
        map.set_stored_block(BlockPosition::new(7, 0, 3), Block::from_kind(200));
        fill_liquid(&mut map);
        let once = ground(&map);

        assert_eq!(fill_liquid(&mut map), 0);
        assert_eq!(ground(&map), once);
    }

    #[test]
    fn generator_floods_new_maps() {
        let map = WorldGenerator::generate(16, 32, 16).unwrap();
        assert_eq!(map.chunk_count(), 2);
        assert!(ground(&map).iter().all(|block| !block.is_empty()));
        assert!(WorldGenerator::generate(15, 16, 16).is_err());
    }
}
