use crate::world::MapError;
use std::{
    fmt::{self, Display, Formatter},
    path::Path,
};

/// How a native map file stores each block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BlockEncoding {
    /// One byte per block holding the legacy color id. No spawn point trailer.
    ColorId,
    /// Four bytes per block holding the packed RGBA color, followed by the spawn point trailer.
    Rgba32,
}

impl BlockEncoding {
    /// Bytes per block.
    pub const fn width(self) -> usize {
        match self {
            BlockEncoding::ColorId => 1,
            BlockEncoding::Rgba32 => 4,
        }
    }

    pub const fn has_spawn_points(self) -> bool {
        matches!(self, BlockEncoding::Rgba32)
    }
}

/// A map file format, resolved once from the file name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MapFormat {
    Native(BlockEncoding),
    /// The third-party column span format, import only.
    Vxl,
}

impl MapFormat {
    pub const RGBA_EXTENSION: &'static str = "rch";
    pub const COLOR_ID_EXTENSION: &'static str = "rcl";
    pub const VXL_EXTENSION: &'static str = "vxl";

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            Self::RGBA_EXTENSION => Some(MapFormat::Native(BlockEncoding::Rgba32)),
            Self::COLOR_ID_EXTENSION => Some(MapFormat::Native(BlockEncoding::ColorId)),
            Self::VXL_EXTENSION => Some(MapFormat::Vxl),
            _ => None,
        }
    }

    /// Resolves the format of a map file, failing with `UnsupportedFormat` for unknown extensions.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, MapError> {
        let extension = extension_of(path.as_ref());
        Self::from_extension(&extension).ok_or(MapError::UnsupportedFormat(extension))
    }

    pub const fn extension(self) -> &'static str {
        match self {
            MapFormat::Native(BlockEncoding::Rgba32) => Self::RGBA_EXTENSION,
            MapFormat::Native(BlockEncoding::ColorId) => Self::COLOR_ID_EXTENSION,
            MapFormat::Vxl => Self::VXL_EXTENSION,
        }
    }

    pub const fn is_native(self) -> bool {
        matches!(self, MapFormat::Native(_))
    }
}

impl Display for MapFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}
