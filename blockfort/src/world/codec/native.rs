use super::BlockEncoding;
use crate::world::{Chunk, MapData, MapError};
use blockfort_data::{Block, BlockColor, BlockPosition, ChunkPosition, SpawnPoint, CHUNK_VOLUME};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Size of the `width, height, depth` header in bytes.
pub const HEADER_SIZE: usize = 12;

/// The exact number of bytes [`write_map`] produces for a map.
pub fn encoded_len(map: &MapData, encoding: BlockEncoding) -> usize {
    let mut len = HEADER_SIZE + map.chunk_count() * CHUNK_VOLUME * encoding.width();
    if encoding.has_spawn_points() {
        len += 4 + map.spawn_points().len() * 12;
    }
    len
}

pub fn read_map<R: Read>(reader: &mut R, encoding: BlockEncoding) -> Result<MapData, MapError> {
    let width = reader.read_i32::<LittleEndian>()?;
    let height = reader.read_i32::<LittleEndian>()?;
    let depth = reader.read_i32::<LittleEndian>()?;

    let count = match MapData::checked_chunk_count(width, height, depth) {
        Ok(count) => count,
        Err(error) => return Err(MapError::InvalidFormat(error.to_string())),
    };

    // Sized per chunk rather than up front so a lying header cannot force a huge allocation
    let mut chunks = Vec::new();
    let mut buffer = vec![0u8; CHUNK_VOLUME * encoding.width()];

    for _ in 0 .. count {
        reader.read_exact(&mut buffer)?;
        let blocks = decode_blocks(&buffer, encoding);
        match Chunk::from_blocks(blocks) {
            Some(chunk) => chunks.push(chunk),
            None => return Err(MapError::InvalidFormat("malformed chunk record".to_owned())),
        }
    }

    let spawn_points = if encoding.has_spawn_points() {
        read_spawn_points(reader)?
    } else {
        Vec::new()
    };

    MapData::from_chunks(width, height, depth, chunks, spawn_points)
}

// Each encoding stores one field of a block. The other is derived, so kinds survive packed colors.
fn decode_blocks(buffer: &[u8], encoding: BlockEncoding) -> Vec<Block> {
    match encoding {
        BlockEncoding::ColorId => buffer.iter().map(|&kind| Block::from_kind(kind)).collect(),
        BlockEncoding::Rgba32 => buffer
            .chunks_exact(4)
            .map(|bytes| Block::from_color(BlockColor::from_packed(LittleEndian::read_u32(bytes))))
            .collect(),
    }
}

fn read_spawn_points<R: Read>(reader: &mut R) -> Result<Vec<SpawnPoint>, MapError> {
    let count = reader.read_i32::<LittleEndian>()?;
    if count < 0 {
        return Err(MapError::InvalidFormat(format!(
            "negative spawn point count {}",
            count
        )));
    }

    let mut spawn_points = Vec::new();
    for _ in 0 .. count {
        let x = reader.read_i32::<LittleEndian>()?;
        let y = reader.read_i32::<LittleEndian>()?;
        let z = reader.read_i32::<LittleEndian>()?;
        spawn_points.push(SpawnPoint::new(BlockPosition::new(x, y, z)));
    }

    Ok(spawn_points)
}

pub fn write_map<W: Write>(
    writer: &mut W,
    map: &MapData,
    encoding: BlockEncoding,
) -> Result<(), MapError> {
    writer.write_i32::<LittleEndian>(map.width())?;
    writer.write_i32::<LittleEndian>(map.height())?;
    writer.write_i32::<LittleEndian>(map.depth())?;

    // Walk chunk coordinates explicitly so the file order is tied to the index formula
    for cx in 0 .. map.chunks_x() {
        for cy in 0 .. map.chunks_y() {
            for cz in 0 .. map.chunks_z() {
                let index = map.chunk_index(ChunkPosition::new(cx as i32, cy as i32, cz as i32));
                debug_assert_eq!(
                    index,
                    (cx * map.chunks_y() + cy) * map.chunks_z() + cz,
                    "Chunk visited out of order."
                );

                let chunk = match map.chunk(index) {
                    Some(chunk) => chunk,
                    None =>
                        return Err(MapError::InvalidFormat(format!(
                            "chunk {} missing from map",
                            index
                        ))),
                };

                write_blocks(writer, chunk, encoding)?;
            }
        }
    }

    if encoding.has_spawn_points() {
        writer.write_i32::<LittleEndian>(spawn_point_count(map.spawn_points().len())?)?;
        for spawn in map.spawn_points() {
            writer.write_i32::<LittleEndian>(spawn.position.x)?;
            writer.write_i32::<LittleEndian>(spawn.position.y)?;
            writer.write_i32::<LittleEndian>(spawn.position.z)?;
        }
    }

    Ok(())
}

fn spawn_point_count(len: usize) -> Result<i32, MapError> {
    i32::try_from(len)
        .map_err(|_| MapError::InvalidFormat(format!("{} spawn points do not fit the trailer", len)))
}

fn write_blocks<W: Write>(writer: &mut W, chunk: &Chunk, encoding: BlockEncoding) -> Result<(), MapError> {
    match encoding {
        BlockEncoding::ColorId =>
            for block in chunk.blocks() {
                writer.write_u8(block.kind)?;
            },
        BlockEncoding::Rgba32 =>
            for block in chunk.blocks() {
                writer.write_u32::<LittleEndian>(block.color.to_packed())?;
            },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_map(encoding: BlockEncoding, seed: u64) -> MapData {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut map = MapData::new(32, 16, 48).unwrap();

        for x in 0 .. map.width() {
            for y in 0 .. map.height() {
                for z in 0 .. map.depth() {
                    if rng.gen_bool(0.6) {
                        continue;
                    }

                    let block = match encoding {
                        BlockEncoding::ColorId => Block::from_kind(rng.gen()),
                        BlockEncoding::Rgba32 => Block::from_color(BlockColor::from_packed(rng.gen())),
                    };
                    map.set_stored_block(BlockPosition::new(x, y, z), block);
                }
            }
        }

        if encoding.has_spawn_points() {
            map.spawn_points_mut()
                .push(SpawnPoint::new(BlockPosition::new(3, 4, 5)));
            map.spawn_points_mut()
                .push(SpawnPoint::new(BlockPosition::new(-1, 20, 7)));
        }

        map
    }

    fn encode(map: &MapData, encoding: BlockEncoding) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_map(&mut bytes, map, encoding).unwrap();
        bytes
    }

    fn assert_same_map(a: &MapData, b: &MapData) {
        assert_eq!(
            (a.width(), a.height(), a.depth()),
            (b.width(), b.height(), b.depth()),
            "Dimensions changed."
        );
        assert!(a.chunks() == b.chunks(), "Chunk contents changed.");
        assert_eq!(a.spawn_points(), b.spawn_points(), "Spawn points changed.");
    }

    #[test]
    fn random_grids_survive_both_encodings() {
        for (seed, encoding) in [(1, BlockEncoding::Rgba32), (2, BlockEncoding::ColorId)] {
            let map = random_map(encoding, seed);
            let bytes = encode(&map, encoding);
            assert_eq!(bytes.len(), encoded_len(&map, encoding));

            let decoded = read_map(&mut bytes.as_slice(), encoding).unwrap();
            assert_same_map(&map, &decoded);
        }
    }

    #[test]
    fn blocks_from_either_constructor_survive() {
        let mut map = MapData::new(16, 16, 16).unwrap();
        let kinds = [
            (BlockPosition::new(2, 3, 4), Block::from_kind(5)),
            (BlockPosition::new(2, 3, 5), Block::from_kind(200)),
            (BlockPosition::new(7, 1, 1), Block::from_color(BlockColor::new(90, 90, 90, 255))),
        ];
        let colors = [
            (BlockPosition::new(9, 9, 9), Block::from_color(BlockColor::new(12, 200, 7, 255))),
            (BlockPosition::new(0, 15, 0), Block::from_color(BlockColor::new(1, 1, 1, 40))),
        ];
        for &(pos, block) in kinds.iter().chain(colors.iter()) {
            map.set_stored_block(pos, block);
        }

        let decoded = read_map(
            &mut encode(&map, BlockEncoding::Rgba32).as_slice(),
            BlockEncoding::Rgba32,
        )
        .unwrap();
        for &(pos, block) in kinds.iter().chain(colors.iter()) {
            assert_eq!(decoded.stored_block(pos), Some(block), "Block at {:?} changed.", pos);
        }
        assert!(decoded.chunks() == map.chunks(), "Packed colors lost a block.");

        // The legacy encoding only stores kinds, so grey blocks survive and other colors collapse
        let decoded = read_map(
            &mut encode(&map, BlockEncoding::ColorId).as_slice(),
            BlockEncoding::ColorId,
        )
        .unwrap();
        for &(pos, block) in &kinds {
            assert_eq!(decoded.stored_block(pos), Some(block), "Block at {:?} changed.", pos);
        }
        for &(pos, _) in &colors {
            assert_eq!(decoded.stored_block(pos), Some(Block::from_kind(Block::SOLID)));
        }
    }

    #[test]
    fn spawn_point_counts_must_fit_the_trailer() {
        assert_eq!(spawn_point_count(3).unwrap(), 3);
        assert_eq!(spawn_point_count(i32::MAX as usize).unwrap(), i32::MAX);
        assert!(matches!(spawn_point_count(usize::MAX), Err(MapError::InvalidFormat(_))));
    }

    #[test]
    fn header_is_little_endian() {
        let map = MapData::new(16, 32, 48).unwrap();
        let bytes = encode(&map, BlockEncoding::ColorId);
        assert_eq!(&bytes[.. HEADER_SIZE], &[16, 0, 0, 0, 32, 0, 0, 0, 48, 0, 0, 0]);
    }

    #[test]
    fn empty_chunks_are_still_written() {
        let map = MapData::new(16, 16, 32).unwrap();

        let bytes = encode(&map, BlockEncoding::ColorId);
        assert_eq!(bytes.len(), 12 + 2 * CHUNK_VOLUME);
        assert!(bytes[HEADER_SIZE ..].iter().all(|&byte| byte == 0));

        let bytes = encode(&map, BlockEncoding::Rgba32);
        assert_eq!(bytes.len(), 12 + 2 * CHUNK_VOLUME * 4 + 4);
    }

    #[test]
    fn one_empty_chunk_among_eight() {
        let mut map = MapData::new(32, 32, 32).unwrap();
        for index in 1 .. map.chunk_count() {
            let origin = map.chunk_position(index).origin();
            map.set_stored_block(origin, Block::from_kind(3));
        }
        assert!(map.chunk(0).unwrap().is_empty());

        let bytes = encode(&map, BlockEncoding::Rgba32);
        assert_eq!(bytes.len(), 12 + 8 * CHUNK_VOLUME * 4 + 4);
        assert!(bytes[HEADER_SIZE .. HEADER_SIZE + CHUNK_VOLUME * 4]
            .iter()
            .all(|&byte| byte == 0));

        let decoded = read_map(&mut bytes.as_slice(), BlockEncoding::Rgba32).unwrap();
        assert!(decoded.chunk(0).unwrap().is_empty());
        assert_eq!(decoded.chunks()[1 ..].iter().map(Chunk::block_count).sum::<usize>(), 7);
    }

    #[test]
    fn blocks_land_in_chunk_then_local_order() {
        let mut map = MapData::new(16, 16, 32).unwrap();
        // Second chunk along Z, local (1, 2, 3)
        map.set_stored_block(BlockPosition::new(1, 2, 19), Block::from_kind(77));

        let bytes = encode(&map, BlockEncoding::ColorId);
        let offset = HEADER_SIZE + CHUNK_VOLUME + 256 + 2 * 16 + 3;
        assert_eq!(bytes[offset], 77);
        assert_eq!(bytes.iter().filter(|&&byte| byte != 0).count(), 4);
    }

    #[test]
    fn packed_colors_are_stored_little_endian() {
        let mut map = MapData::new(16, 16, 16).unwrap();
        map.set_stored_block(
            BlockPosition::new(0, 0, 0),
            Block::from_color(BlockColor::new(0x11, 0x22, 0x33, 0x44)),
        );

        let bytes = encode(&map, BlockEncoding::Rgba32);
        assert_eq!(&bytes[HEADER_SIZE .. HEADER_SIZE + 4], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn truncated_streams_are_invalid() {
        let map = random_map(BlockEncoding::Rgba32, 9);
        let bytes = encode(&map, BlockEncoding::Rgba32);

        for cut in [0, 5, HEADER_SIZE, HEADER_SIZE + 100, bytes.len() - 1] {
            let result = read_map(&mut &bytes[.. cut], BlockEncoding::Rgba32);
            assert!(
                matches!(result, Err(MapError::InvalidFormat(_))),
                "Stream cut at {} was accepted.",
                cut
            );
        }
    }

    #[test]
    fn bad_headers_are_invalid() {
        let mut bytes = Vec::new();
        for dim in [17i32, 16, 16] {
            bytes.extend_from_slice(&dim.to_le_bytes());
        }
        assert!(matches!(
            read_map(&mut bytes.as_slice(), BlockEncoding::ColorId),
            Err(MapError::InvalidFormat(_))
        ));

        let mut bytes = encode(&MapData::new(16, 16, 16).unwrap(), BlockEncoding::Rgba32);
        let trailer = bytes.len() - 4;
        bytes[trailer ..].copy_from_slice(&(-3i32).to_le_bytes());
        assert!(matches!(
            read_map(&mut bytes.as_slice(), BlockEncoding::Rgba32),
            Err(MapError::InvalidFormat(_))
        ));
    }
}
