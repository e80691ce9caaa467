/// Defines the host config.
pub mod config;
mod session;

pub use config::Config;
pub use session::MapSession;
