mod replication;
mod transfer;

pub use replication::*;
pub use transfer::*;
