use log::*;
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, OpenOptions},
    io::{self, prelude::*, SeekFrom},
    path::{Path, PathBuf},
    time::Duration,
};

/// The host configuration, stored as JSON.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(default)]
pub struct Config {
    /// The map opened at startup, defaults to "default.rch". The extension picks the format.
    pub map_name: String,
    /// Where maps are loaded from and saved to, defaults to "./maps".
    pub maps_directory: PathBuf,
    /// The largest frame a map transfer sends, in bytes. Defaults to 16384.
    pub transfer_frame_size: usize,
    /// Pause between two transfer frames, in milliseconds. Defaults to 10.
    pub transfer_frame_delay_ms: u64,
    /// Whether `stop` saves the map before exiting, defaults to true.
    pub save_on_stop: bool,
}

impl Config {
    pub fn transfer_frame_delay(&self) -> Duration {
        Duration::from_millis(self.transfer_frame_delay_ms)
    }
}

// Instantiate a config with default values
impl Default for Config {
    fn default() -> Self {
        Config {
            map_name: "default.rch".to_owned(),
            maps_directory: PathBuf::from("./maps"),
            transfer_frame_size: 16384,
            transfer_frame_delay_ms: 10,
            save_on_stop: true,
        }
    }
}

/// Attempts to parse the configuration at the given path. If the file does not exist it is created
/// with default values, and if it is not valid JSON it is overwritten with them.
pub fn load_config(path: &Path) -> io::Result<Config> {
    if path.exists() {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;

        let mut json = String::new();
        file.read_to_string(&mut json)?;

        match serde_json::from_str(&json) {
            Ok(config) => Ok(config),
            Err(e) => {
                error!("Invalid config JSON: {}", e);
                use_default(&mut file)
            }
        }
    } else {
        info!("Config file not found, creating file");
        use_default(&mut File::create(path)?)
    }
}

fn use_default(file: &mut File) -> io::Result<Config> {
    info!("Using default configurations");

    let default = Config::default();

    // Go to the beginning of the file
    file.seek(SeekFrom::Start(0))?;

    let json = serde_json::to_string_pretty(&default).map_err(io::Error::from)?;
    let bytes = json.as_bytes();
    file.write_all(bytes)?;

    // Reset the file length
    file.set_len(bytes.len() as u64)?;

    Ok(default)
}
