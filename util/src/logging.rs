use std::{
    error::Error,
    fmt,
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    thread,
};

use anyhow::anyhow;
use chrono::prelude::*;
use flate2::{write::GzEncoder, Compression};
use linefeed::{terminal::DefaultTerminal, Interface};
use log::*;
use log4rs::{
    append::{
        rolling_file::{
            policy::compound::{roll::Roll, trigger::Trigger, CompoundPolicy},
            LogFile,
            RollingFileAppender,
        },
        Append,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
    filter::{Filter, Response},
};
#[cfg(unix)]
use termion::color;

#[cfg(debug_assertions)]
const LEVEL_FILTER: LevelFilter = LevelFilter::Debug;
#[cfg(not(debug_assertions))]
const LEVEL_FILTER: LevelFilter = LevelFilter::Info;

const LIVE_LOG: &str = "latest.log";
const STAGING_LOG: &str = "latest-tmp.log";

/// Where and how large log files may grow before they are rolled.
#[derive(Clone, Debug)]
pub struct LogSettings {
    /// The directory holding `latest.log` and the compressed history.
    pub directory: PathBuf,
    /// The size in bytes after which the live log is rolled.
    pub file_size_limit: u64,
}

impl LogSettings {
    fn live_log(&self) -> PathBuf {
        self.directory.join(LIVE_LOG)
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            directory: PathBuf::from("./logs"),
            file_size_limit: 50_000_000,
        }
    }
}

/// Routes the `log` facade to the console interface and to a rolling log file.
///
/// Console lines look like `[HH:MM:SS Level]: message` and are colored by level on unix. Debug and
/// trace records are only accepted from modules whose path starts with one of `crate_prefixes`,
/// and are dropped entirely in release builds.
///
/// The live log is rolled when it exceeds the size limit or when the day changes. Rolled logs are
/// gz-compressed to `yyyy-mm-dd-N.log.gz` inside the log directory.
pub fn init_logger(
    settings: &LogSettings,
    crate_prefixes: &[&str],
    console_interface: Arc<Interface<DefaultTerminal>>,
) -> Result<(), Box<dyn Error>> {
    let console = ConsoleAppender { console_interface };

    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("[{d(%H:%M:%S)} {l}]: {m}\n")))
        .build(
            settings.live_log(),
            Box::new(CompoundPolicy::new(
                Box::new(DailySizeTrigger::new(settings.file_size_limit)),
                Box::new(GzRoller::new(settings.directory.clone())),
            )),
        )?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(CrateFilter::new(crate_prefixes)))
                .build("console", Box::new(console)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(CrateFilter::new(crate_prefixes)))
                .build("logfile", Box::new(logfile)),
        )
        .build(
            Root::builder()
                .appender("console")
                .appender("logfile")
                .build(LEVEL_FILTER),
        )?;

    log4rs::init_config(config)?;

    Ok(())
}

/// Compresses the live log. Call this right before the process exits.
pub fn cleanup(settings: &LogSettings) {
    let live = settings.live_log();
    if live.exists() {
        let _ = GzRoller::new(settings.directory.clone()).roll_threaded(&live, false);
    }
}

struct CrateFilter {
    prefixes: Vec<String>,
}

impl CrateFilter {
    fn new(prefixes: &[&str]) -> Self {
        CrateFilter {
            prefixes: prefixes.iter().map(|&prefix| prefix.to_owned()).collect(),
        }
    }

    fn accepts(&self, level: Level, module_path: Option<&str>) -> bool {
        if level != Level::Debug && level != Level::Trace {
            return true;
        }

        if cfg!(not(debug_assertions)) {
            return false;
        }

        match module_path {
            Some(path) => self.prefixes.iter().any(|prefix| path.starts_with(prefix)),
            None => false,
        }
    }
}

impl Filter for CrateFilter {
    fn filter(&self, record: &Record<'_>) -> Response {
        if self.accepts(record.level(), record.module_path()) {
            Response::Neutral
        } else {
            Response::Reject
        }
    }
}

impl fmt::Debug for CrateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.prefixes).finish()
    }
}

// Writes through linefeed so log lines don't mangle what the user is typing
struct ConsoleAppender {
    console_interface: Arc<Interface<DefaultTerminal>>,
}

impl Append for ConsoleAppender {
    #[cfg(unix)]
    fn append(&self, record: &Record<'_>) -> anyhow::Result<()> {
        let mut writer = self.console_interface.lock_writer_erase()?;
        match record.metadata().level() {
            Level::Error => write!(writer, "{}", color::Fg(color::Red))?,
            Level::Warn => write!(writer, "{}", color::Fg(color::LightYellow))?,
            Level::Debug => write!(writer, "{}", color::Fg(color::LightCyan))?,
            _ => write!(writer, "{}", color::Fg(color::Reset))?,
        }
        writeln!(
            writer,
            "[{} {}]: {}{}",
            Local::now().format("%H:%M:%S"),
            record.metadata().level(),
            record.args(),
            color::Fg(color::Reset)
        )?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn append(&self, record: &Record<'_>) -> anyhow::Result<()> {
        let mut writer = self.console_interface.lock_writer_erase()?;
        writeln!(
            writer,
            "[{} {}]: {}",
            Local::now().format("%H:%M:%S"),
            record.metadata().level(),
            record.args()
        )?;
        Ok(())
    }

    fn flush(&self) {}
}

impl fmt::Debug for ConsoleAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConsoleAppender")
    }
}

// Fires when the live log gets too large or a new day starts
struct DailySizeTrigger {
    last_day: Mutex<u32>,
    max_size: u64,
}

impl DailySizeTrigger {
    fn new(max_size: u64) -> Self {
        DailySizeTrigger {
            last_day: Mutex::new(Local::now().ordinal()),
            max_size,
        }
    }
}

impl fmt::Debug for DailySizeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DailySizeTrigger({})", self.max_size)
    }
}

impl Trigger for DailySizeTrigger {
    fn trigger(&self, file: &LogFile<'_>) -> anyhow::Result<bool> {
        if let Ok(mut guard) = self.last_day.lock() {
            let current_day = Local::now().ordinal();
            if current_day != *guard {
                *guard = current_day;
                return Ok(true);
            }
        }

        Ok(file.len_estimate() > self.max_size)
    }
}

struct GzRoller {
    directory: PathBuf,
    // (day of year, number of logs rolled that day)
    name_info: Mutex<(u32, u32)>,
}

impl GzRoller {
    fn new(directory: PathBuf) -> Self {
        let today = Local::now().format("%Y-%m-%d").to_string();
        let max_index = fs::read_dir(&directory)
            .map(|entries| {
                entries
                    .flatten()
                    .filter_map(|entry| entry.file_name().into_string().ok())
                    .filter(|name| name.starts_with(&today))
                    .filter_map(|name| index_from_name(&name))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);

        GzRoller {
            directory,
            name_info: Mutex::new((Local::now().ordinal(), max_index)),
        }
    }

    fn roll_threaded(&self, file: &Path, threaded: bool) -> anyhow::Result<()> {
        let mut guard = self
            .name_info
            .lock()
            .map_err(|_| anyhow!("log roller mutex poisoned"))?;

        let now = Local::now();
        if now.ordinal() != guard.0 {
            *guard = (now.ordinal(), 1);
        } else {
            guard.1 += 1;
        }

        // Move the file out of the way first, compressing a large log can take a while
        let staged = self.directory.join(STAGING_LOG);
        fs::rename(file, &staged)?;

        let output = self
            .directory
            .join(format!("{}-{}.log.gz", now.format("%Y-%m-%d"), guard.1));

        if threaded {
            thread::spawn(move || try_compress_log(&staged, &output));
        } else {
            try_compress_log(&staged, &output);
        }

        Ok(())
    }
}

impl Roll for GzRoller {
    fn roll(&self, file: &Path) -> anyhow::Result<()> {
        self.roll_threaded(file, true)
    }
}

impl fmt::Debug for GzRoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GzRoller({})", self.directory.display())
    }
}

// Parses N out of `yyyy-mm-dd-N.log.gz`
fn index_from_name(name: &str) -> Option<u32> {
    let stem = name.split('.').next()?;
    let dash_index = stem.rfind('-')?;
    stem[dash_index + 1 ..].parse::<u32>().ok()
}

fn try_compress_log(input: &Path, output: &Path) {
    if let Err(e) = compress_log(input, output) {
        error!("Failed to compress log file {}: {}", input.display(), e);
    }
}

fn compress_log(input_path: &Path, output_path: &Path) -> io::Result<()> {
    let mut input = File::open(input_path)?;
    let mut output = GzEncoder::new(File::create(output_path)?, Compression::default());
    io::copy(&mut input, &mut output)?;
    drop(output.finish()?);
    // Some platforms refuse to delete open files
    drop(input);
    fs::remove_file(input_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::{Read, Write};

    #[test]
    fn rolled_log_names() {
        assert_eq!(index_from_name("2024-03-09-4.log.gz"), Some(4));
        assert_eq!(index_from_name("2024-03-09-12.log.gz"), Some(12));
        assert_eq!(index_from_name("latest.log"), None);
    }

    #[test]
    fn debug_records_filtered_by_prefix() {
        let filter = CrateFilter::new(&["blockfort"]);
        assert!(filter.accepts(Level::Info, Some("tokio::runtime")));
        assert!(filter.accepts(Level::Error, None));
        assert!(!filter.accepts(Level::Debug, Some("tokio::runtime")));
        assert_eq!(
            filter.accepts(Level::Debug, Some("blockfort::world")),
            cfg!(debug_assertions)
        );
    }

    #[test]
    fn compressed_log_round_trip() {
        let dir = std::env::temp_dir().join(format!("blockfort-log-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("input.log");
        let output = dir.join("output.log.gz");
        File::create(&input)
            .unwrap()
            .write_all(b"[12:00:00 INFO]: map loaded\n")
            .unwrap();

        compress_log(&input, &output).unwrap();
        assert!(!input.exists(), "Source log should be removed after compression.");

        let mut text = String::new();
        GzDecoder::new(File::open(&output).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "[12:00:00 INFO]: map loaded\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
