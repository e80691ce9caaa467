use crate::world::MapProvider;
use blockfort_data::BlockPosition;

/// Every valid, non-empty block within `radius` of `center`, in x, y, z scan order. Used to work
/// out which blocks an explosion removes.
///
/// The scan box is clipped to the map, so a center far outside it simply finds nothing.
pub fn sphere(provider: &MapProvider, center: BlockPosition, radius: i32) -> Vec<BlockPosition> {
    let map = provider.map_data();
    let radius = i64::from(radius.max(0));
    let limit = radius * radius;
    // Ground layer excluded, it is never valid
    let span = |center: i32, min: i64, len: i32| {
        let center = i64::from(center);
        (center - radius).max(min) ..= (center + radius).min(i64::from(len) - 1)
    };

    let mut blocks = Vec::new();

    for x in span(center.x, 0, map.width()) {
        for y in span(center.y, 1, map.height()) {
            for z in span(center.z, 0, map.depth()) {
                // Clipped to the map, so every coordinate fits an i32
                let pos = BlockPosition::new(x as i32, y as i32, z as i32);
                if pos.distance_squared(&center) > limit {
                    continue;
                }

                if let Ok(block) = provider.block_at(pos) {
                    if !block.is_empty() {
                        blocks.push(pos);
                    }
                }
            }
        }
    }

    blocks
}
