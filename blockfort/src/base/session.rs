use crate::{
    config::Config,
    network::MapTransfer,
    world::{
        codec::{self, BlockEncoding, MapFormat},
        liquid,
        ChunkAdjacency,
        MapData,
        MapError,
        MapObserver,
        MapProvider,
        MapUpdater,
    },
};
use blockfort_data::{Block, BlockPosition};
use log::*;
use parking_lot::RwLock;
use std::sync::Arc;

/// One open map and everything derived from it.
///
/// The session is cheap to clone; clones share the same map. Writers take the write lock for a
/// single update, while snapshots hold the read lock for the whole encode so they never observe a
/// half applied batch.
#[derive(Clone)]
pub struct MapSession {
    updater: Arc<RwLock<MapUpdater>>,
    adjacency: Arc<ChunkAdjacency>,
    config: Arc<Config>,
}

impl MapSession {
    /// Loads the configured map, or generates the default world if it has never been saved.
    pub fn open(config: Config) -> Result<Self, MapError> {
        let map = codec::load_map(&config.maps_directory, &config.map_name)?;
        Ok(Self::from_map(map, config))
    }

    /// Publishes an already built map. The ground layer is flooded first, before anyone can
    /// subscribe to changes.
    pub fn from_map(mut map: MapData, config: Config) -> Self {
        let filled = liquid::fill_liquid(&mut map);
        if filled > 0 {
            debug!("Flooded {} ground cells of {}", filled, config.map_name);
        }

        let adjacency = ChunkAdjacency::new(&map);
        MapSession {
            updater: Arc::new(RwLock::new(MapUpdater::new(MapProvider::new(map)))),
            adjacency: Arc::new(adjacency),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn adjacency(&self) -> &ChunkAdjacency {
        &self.adjacency
    }

    /// Runs `f` with shared access to the map.
    pub fn read<F, T>(&self, f: F) -> T
    where F: FnOnce(&MapProvider) -> T {
        f(self.updater.read().provider())
    }

    pub fn block_at(&self, pos: BlockPosition) -> Result<Block, MapError> {
        self.updater.read().provider().block_at(pos)
    }

    pub fn set_block(&self, pos: BlockPosition, block: Block) -> Result<(), MapError> {
        self.updater.write().set_block(pos, block)
    }

    pub fn set_blocks<I>(&self, blocks: I) -> Result<usize, MapError>
    where I: IntoIterator<Item = (BlockPosition, Block)> {
        self.updater.write().set_blocks(blocks)
    }

    pub fn subscribe<O>(&self, observer: O)
    where O: MapObserver + 'static {
        self.updater.write().subscribe(observer);
    }

    /// The format snapshots are encoded in: the configured map's own format when it is native,
    /// packed colors otherwise.
    pub fn snapshot_format(&self) -> MapFormat {
        match MapFormat::from_path(&self.config.map_name) {
            Ok(format @ MapFormat::Native(_)) => format,
            _ => MapFormat::Native(BlockEncoding::Rgba32),
        }
    }

    /// Encodes the whole map as it is right now.
    pub fn encode_snapshot(&self) -> Result<Vec<u8>, MapError> {
        let updater = self.updater.read();
        codec::encode(updater.provider().map_data(), self.snapshot_format())
    }

    /// A snapshot split into frames sized for the network layer.
    pub fn transfer(&self) -> Result<MapTransfer, MapError> {
        let payload = self.encode_snapshot()?;
        MapTransfer::new(payload, self.config.transfer_frame_size).ok_or_else(|| {
            MapError::InvalidFormat("transfer frame size must be at least one byte".to_owned())
        })
    }

    /// Saves the map under `name`, or under the configured name if none is given.
    pub fn save(&self, name: Option<&str>) -> Result<(), MapError> {
        let name = name.unwrap_or(&self.config.map_name);
        let updater = self.updater.read();
        codec::save_map(&self.config.maps_directory, name, updater.provider().map_data())
    }
}
