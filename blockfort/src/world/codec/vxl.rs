//! Import of `.vxl` maps, the column-span format used by Voxlap era games.
//!
//! A VXL map is 512 x 512 columns, 64 cells tall, with z growing downwards. Each column is a run
//! of spans, each span starting with a four byte header `[N, S, E, A]`:
//!
//! * cells from the current z up to `S` are air,
//! * cells `S ..= E` are the top colors, stored right after the header,
//! * if `N` is zero the column ends and everything below `E` is solid,
//! * otherwise `N - 1 - (E - S + 1)` bottom colors follow, ending just above the next span's `A`.
//!
//! Solid cells that carry no color get [`GROUND_COLOR`].

use crate::world::{MapData, MapError};
use blockfort_data::{Block, BlockColor, BlockPosition};
use log::debug;
use std::io::Read;

/// Columns along each horizontal axis.
pub const VXL_SIDE: i32 = 512;
/// Cells per column.
pub const VXL_HEIGHT: i32 = 64;
/// The color given to solid cells the file does not color.
pub const GROUND_COLOR: BlockColor = BlockColor::new(103, 64, 40, 255);

const COLUMN_HEIGHT: usize = VXL_HEIGHT as usize;

/// Reads a whole VXL stream into a `512x64x512` map.
pub fn read_vxl<R: Read>(reader: &mut R) -> Result<MapData, MapError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let mut map = MapData::new(VXL_SIDE, VXL_HEIGHT, VXL_SIDE)?;
    let consumed = decode_columns(&data, VXL_SIDE, &mut map)?;
    if consumed < data.len() {
        debug!("Ignoring {} trailing bytes after VXL columns", data.len() - consumed);
    }

    Ok(map)
}

/// Decodes `side * side` columns into `map`, which must be `side` wide, `side` deep and
/// [`VXL_HEIGHT`] tall. Returns the number of bytes consumed.
pub(crate) fn decode_columns(data: &[u8], side: i32, map: &mut MapData) -> Result<usize, MapError> {
    let mut offset = 0;

    for vy in 0 .. side {
        for vx in 0 .. side {
            let mut column = [Block::from_color(GROUND_COLOR); COLUMN_HEIGHT];
            offset = decode_column(data, offset, &mut column)?;

            for (vz, block) in column.iter().enumerate() {
                if block.is_empty() {
                    continue;
                }

                let pos = BlockPosition::new(vx, VXL_HEIGHT - 1 - vz as i32, vy);
                if !map.set_stored_block(pos, *block) {
                    return Err(MapError::InvalidFormat(format!(
                        "VXL column ({}, {}) does not fit a {}x{}x{} map",
                        vx,
                        vy,
                        map.width(),
                        map.height(),
                        map.depth()
                    )));
                }
            }
        }
    }

    Ok(offset)
}

/// Decodes one column starting at `offset` and returns the offset of the next column.
fn decode_column(data: &[u8], mut offset: usize, column: &mut [Block; COLUMN_HEIGHT]) -> Result<usize, MapError> {
    let mut z = 0usize;

    loop {
        let header = bytes(data, offset, 4)?;
        let span_len = header[0] as usize;
        let top_start = header[1] as usize;
        let top_end = header[2] as usize;

        if top_end >= COLUMN_HEIGHT || top_end + 1 < top_start {
            return Err(malformed(offset));
        }

        for cell in column.iter_mut().take(top_start).skip(z) {
            *cell = Block::EMPTY;
        }

        let top_len = top_end + 1 - top_start;
        let mut colors = offset + 4;
        for cell in &mut column[top_start ..= top_end] {
            *cell = Block::from_color(color_at(data, colors)?);
            colors += 4;
        }

        if span_len == 0 {
            return Ok(offset + 4 * (top_len + 1));
        }

        let bottom_len = match (span_len - 1).checked_sub(top_len) {
            Some(len) => len,
            None => return Err(malformed(offset)),
        };

        offset += span_len * 4;
        let air_start = bytes(data, offset, 4)?[3] as usize;
        if air_start > COLUMN_HEIGHT || bottom_len > air_start || air_start < z {
            return Err(malformed(offset));
        }

        for cell in &mut column[air_start - bottom_len .. air_start] {
            *cell = Block::from_color(color_at(data, colors)?);
            colors += 4;
        }

        z = air_start;
    }
}

fn bytes(data: &[u8], offset: usize, len: usize) -> Result<&[u8], MapError> {
    data.get(offset .. offset + len)
        .ok_or_else(|| MapError::InvalidFormat("VXL data ends mid column".to_owned()))
}

/// Colors are stored as `B, G, R, shade`. The shade byte is lighting, not opacity.
fn color_at(data: &[u8], offset: usize) -> Result<BlockColor, MapError> {
    let bgra = bytes(data, offset, 4)?;
    Ok(BlockColor::new(bgra[2], bgra[1], bgra[0], 255))
}

fn malformed(offset: usize) -> MapError {
    MapError::InvalidFormat(format!("malformed VXL span at byte {}", offset))
}
