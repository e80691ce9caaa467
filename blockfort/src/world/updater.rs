use crate::world::{MapError, MapProvider};
use blockfort_data::{Block, BlockPosition, SpawnPoint};
use log::debug;

/// Raised after every successful block write.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockChanged {
    pub position: BlockPosition,
    pub block: Block,
}

/// Something that wants to hear about block writes, e.g. a mesh rebuilder or the replication layer.
///
/// Observers run synchronously on the writer's thread, so they must return quickly.
pub trait MapObserver: Send + Sync {
    fn block_changed(&self, change: &BlockChanged);
}

impl<F> MapObserver for F
where F: Fn(&BlockChanged) + Send + Sync
{
    fn block_changed(&self, change: &BlockChanged) {
        self(change)
    }
}

/// The only way to mutate a map once it has been published. Every write is followed by a
/// notification to each observer, in the order the writes happened.
pub struct MapUpdater {
    provider: MapProvider,
    observers: Vec<Box<dyn MapObserver>>,
}

impl MapUpdater {
    pub fn new(provider: MapProvider) -> Self {
        MapUpdater {
            provider,
            observers: Vec::new(),
        }
    }

    #[inline]
    pub fn provider(&self) -> &MapProvider {
        &self.provider
    }

    pub fn into_provider(self) -> MapProvider {
        self.provider
    }

    /// Registers an observer. Observers are notified in registration order.
    pub fn subscribe<O>(&mut self, observer: O)
    where O: MapObserver + 'static {
        self.observers.push(Box::new(observer));
    }

    /// Overwrites one block and notifies observers. Nothing is written if the position is invalid.
    pub fn set_block(&mut self, pos: BlockPosition, block: Block) -> Result<(), MapError> {
        self.provider.map_data_mut().set_block(pos, block)?;
        self.notify(BlockChanged {
            position: pos,
            block,
        });
        Ok(())
    }

    /// Writes a batch of blocks in order. Every position is checked before the first write, so an
    /// invalid position leaves the map untouched.
    pub fn set_blocks<I>(&mut self, blocks: I) -> Result<usize, MapError>
    where I: IntoIterator<Item = (BlockPosition, Block)> {
        let blocks: Vec<_> = blocks.into_iter().collect();

        if let Some(&(pos, _)) = blocks.iter().find(|(pos, _)| !self.provider.is_valid(*pos)) {
            return Err(MapError::OutOfRange(pos));
        }

        for &(pos, block) in &blocks {
            self.set_block(pos, block)?;
        }

        debug!("Wrote {} blocks", blocks.len());
        Ok(blocks.len())
    }

    /// Moves the spawn point at `old` to `new`.
    pub fn update_spawn_point(&mut self, old: BlockPosition, new: BlockPosition) -> Result<(), MapError> {
        let spawn_points = self.provider.map_data_mut().spawn_points_mut();
        let spawn_point = spawn_points
            .iter_mut()
            .find(|point| point.position == old)
            .ok_or(MapError::SpawnPointNotFound(old))?;

        *spawn_point = SpawnPoint::new(new);
        debug!("Moved spawn point from {:?} to {:?}", old, new);
        Ok(())
    }

    fn notify(&self, change: BlockChanged) {
        for observer in &self.observers {
            observer.block_changed(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::MapData;
    use blockfort_data::{BlockColor, LocalPosition, CHUNK_VOLUME};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn updater(width: i32, height: i32, depth: i32) -> MapUpdater {
        MapUpdater::new(MapProvider::new(MapData::new(width, height, depth).unwrap()))
    }

    #[test]
    fn write_then_read_back() {
        let mut updater = updater(32, 32, 32);
        let pos = BlockPosition::new(5, 1, 5);
        updater.set_block(pos, Block::from_kind(1)).unwrap();

        let provider = updater.provider();
        assert_eq!(provider.block_at(pos).unwrap().kind, 1);

        let chunk = provider.chunk(provider.chunk_index_of(pos).unwrap()).unwrap();
        let written = provider.local_position_of(pos).unwrap();
        for index in 0 .. CHUNK_VOLUME {
            let local = LocalPosition::from_index(index);
            if local != written {
                assert!(chunk.block(local).is_empty(), "Unexpected block at {:?}", local);
            }
        }
    }

    #[test]
    fn observers_see_writes_in_order() {
        let mut updater = updater(16, 16, 16);
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let sink = first.clone();
        updater.subscribe(move |change: &BlockChanged| sink.lock().push(*change));
        let sink = second.clone();
        updater.subscribe(move |change: &BlockChanged| sink.lock().push(change.position));

        let writes = [
            (BlockPosition::new(1, 1, 1), Block::from_kind(4)),
            (BlockPosition::new(2, 3, 4), Block::from_color(BlockColor::new(8, 8, 8, 255))),
            (BlockPosition::new(1, 1, 1), Block::EMPTY),
        ];
        for (pos, block) in writes {
            updater.set_block(pos, block).unwrap();
        }

        let expected: Vec<_> = writes
            .iter()
            .map(|&(position, block)| BlockChanged { position, block })
            .collect();
        assert_eq!(*first.lock(), expected);
        assert_eq!(
            *second.lock(),
            writes.iter().map(|(pos, _)| *pos).collect::<Vec<_>>()
        );
        assert!(updater.provider().block_at(BlockPosition::new(1, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn failed_writes_are_silent() {
        let mut updater = updater(16, 16, 16);
        let changes = Arc::new(Mutex::new(0));
        let sink = changes.clone();
        updater.subscribe(move |_: &BlockChanged| *sink.lock() += 1);

        let result = updater.set_block(BlockPosition::new(3, 0, 3), Block::from_kind(1));
        assert!(matches!(result, Err(MapError::OutOfRange(_))));
        assert_eq!(*changes.lock(), 0);
    }

    #[test]
    fn batch_writes_are_all_or_nothing() {
        let mut updater = updater(16, 16, 16);
        let batch = vec![
            (BlockPosition::new(1, 1, 1), Block::from_kind(2)),
            (BlockPosition::new(1, 16, 1), Block::from_kind(2)),
        ];

        assert!(updater.set_blocks(batch).is_err());
        assert!(updater.provider().block_at(BlockPosition::new(1, 1, 1)).unwrap().is_empty());

        let batch = vec![
            (BlockPosition::new(1, 1, 1), Block::from_kind(2)),
            (BlockPosition::new(1, 15, 1), Block::from_kind(3)),
        ];
        assert_eq!(updater.set_blocks(batch).unwrap(), 2);
        assert_eq!(updater.provider().block_at(BlockPosition::new(1, 15, 1)).unwrap().kind, 3);
    }

    #[test]
    fn spawn_points_move() {
        let mut map = MapData::new(16, 16, 16).unwrap();
        map.spawn_points_mut().extend([
            SpawnPoint::new(BlockPosition::new(1, 2, 3)),
            SpawnPoint::new(BlockPosition::new(4, 5, 6)),
        ]);
        let mut updater = MapUpdater::new(MapProvider::new(map));

        updater
            .update_spawn_point(BlockPosition::new(4, 5, 6), BlockPosition::new(7, 8, 9))
            .unwrap();
        assert_eq!(
            updater.provider().spawn_points()[1].position,
            BlockPosition::new(7, 8, 9)
        );

        let missing = updater.update_spawn_point(BlockPosition::new(0, 0, 0), BlockPosition::new(1, 1, 1));
        assert!(matches!(missing, Err(MapError::SpawnPointNotFound(_))));
        assert_eq!(updater.provider().spawn_points().len(), 2);
    }
}
