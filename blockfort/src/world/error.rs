use blockfort_data::BlockPosition;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    io::{Error as IoError, ErrorKind},
};

#[derive(Debug)]
pub enum MapError {
    /// A coordinate outside the map, or on the reserved ground layer.
    OutOfRange(BlockPosition),
    /// A map file extension no loader understands.
    UnsupportedFormat(String),
    /// A malformed stream, or a save to a format that cannot be written.
    InvalidFormat(String),
    InvalidDimensions {
        width: i32,
        height: i32,
        depth: i32,
    },
    SpawnPointNotFound(BlockPosition),
    Io(IoError),
}

impl Display for MapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MapError::OutOfRange(pos) => write!(f, "Block position out of range: {}", pos),
            MapError::UnsupportedFormat(ext) => write!(f, "Unsupported map format \"{}\"", ext),
            MapError::InvalidFormat(msg) => write!(f, "Invalid map data: {}", msg),
            MapError::InvalidDimensions {
                width,
                height,
                depth,
            } => write!(
                f,
                "Invalid map dimensions {}x{}x{}, each must be a positive multiple of the chunk size",
                width, height, depth
            ),
            MapError::SpawnPointNotFound(pos) => write!(f, "No spawn point at {}", pos),
            MapError::Io(error) => Display::fmt(error, f),
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MapError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<IoError> for MapError {
    fn from(x: IoError) -> Self {
        match x.kind() {
            ErrorKind::UnexpectedEof => MapError::InvalidFormat("unexpected end of stream".to_owned()),
            _ => MapError::Io(x),
        }
    }
}
