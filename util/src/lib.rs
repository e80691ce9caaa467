#![warn(missing_docs)]

//! Ambient utilities for blockfort: logging setup and log file maintenance.

/// Configures log4rs for the console and rolling, compressed log files.
pub mod logging;
