#![deny(rust_2018_idioms)]

//! The voxel world store behind the game: chunked map storage, the read and write façades, map
//! file codecs, world generation, and the plumbing that hands a map to the network layer.

// Expose sub-crates
pub use blockfort_data as data;
pub use blockfort_util as util;

mod base;
/// Change replication and framed map transfer.
pub mod network;
/// Map storage, codecs and generation.
pub mod world;

pub use base::*;
