mod format;
pub mod native;
pub mod vxl;

pub use format::*;

use crate::world::{MapData, MapError, WorldGenerator};
use log::{info, warn};
use std::{
    fs::{self, File},
    io::{BufReader, ErrorKind, Read},
    path::Path,
};

/// Encodes a whole map into one contiguous, deterministic payload. Only native formats can be
/// written.
pub fn encode(map: &MapData, format: MapFormat) -> Result<Vec<u8>, MapError> {
    let encoding = match format {
        MapFormat::Native(encoding) => encoding,
        MapFormat::Vxl => return Err(MapError::InvalidFormat(format!("cannot write {} maps", format))),
    };

    let mut payload = Vec::with_capacity(native::encoded_len(map, encoding));
    native::write_map(&mut payload, map, encoding)?;
    Ok(payload)
}

/// Decodes a map from a stream. The returned map is complete; a failed decode yields nothing.
pub fn decode<R: Read>(reader: &mut R, format: MapFormat) -> Result<MapData, MapError> {
    match format {
        MapFormat::Native(encoding) => native::read_map(reader, encoding),
        MapFormat::Vxl => vxl::read_vxl(reader),
    }
}

/// Loads the map called `name` from `maps_dir`, choosing the decoder from its extension.
///
/// A native map that does not exist yet is not an error: a default world is generated instead so
/// that editors always have something to open.
pub fn load_map<P: AsRef<Path>>(maps_dir: P, name: &str) -> Result<MapData, MapError> {
    let path = maps_dir.as_ref().join(name);
    let format = MapFormat::from_path(&path)?;

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound && format.is_native() => {
            warn!(
                "Map file {} does not exist, generating a default world",
                path.display()
            );
            return WorldGenerator::generate_default();
        }
        Err(error) => return Err(MapError::Io(error)),
    };

    let map = decode(&mut BufReader::new(file), format)?;
    info!(
        "Loaded map {} ({}x{}x{}, {} spawn points)",
        path.display(),
        map.width(),
        map.height(),
        map.depth(),
        map.spawn_points().len()
    );
    Ok(map)
}

/// Saves `map` as `name` under `maps_dir`. The encoded map is written to a temporary file first
/// and renamed over the target, so a failed save leaves any previous file intact.
pub fn save_map<P: AsRef<Path>>(maps_dir: P, name: &str, map: &MapData) -> Result<(), MapError> {
    let maps_dir = maps_dir.as_ref();
    let path = maps_dir.join(name);

    let format = match MapFormat::from_path(&path) {
        Ok(format @ MapFormat::Native(_)) => format,
        Ok(format) => return Err(MapError::InvalidFormat(format!("cannot write {} maps", format))),
        Err(_) => {
            let extension = format::extension_of(&path);
            return Err(MapError::InvalidFormat(format!(
                "cannot write maps with extension \"{}\"",
                extension
            )));
        }
    };

    let payload = encode(map, format)?;

    fs::create_dir_all(maps_dir)?;
    let staging = maps_dir.join(format!("{}.tmp", name));
    if let Err(error) = fs::write(&staging, &payload) {
        let _ = fs::remove_file(&staging);
        return Err(MapError::Io(error));
    }
    fs::rename(&staging, &path)?;

    info!("Saved map {} ({} bytes)", path.display(), payload.len());
    Ok(())
}
