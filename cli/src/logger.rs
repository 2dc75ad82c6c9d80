use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use mosaic_core::paths;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

/// Logs to stderr, keeping stdout for command output, and mirrors every
/// record without colors to the log file.
pub struct MosaicLogger {
    max_level: Level,
    log_file: Mutex<Option<File>>,
    target_colors: Mutex<HashMap<String, Color>>,
}

const TARGET_COLORS: [Color; 5] = [Color::Green, Color::Yellow, Color::Blue, Color::Magenta, Color::Cyan];

impl MosaicLogger {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        let max_level = if quiet {
            Level::Info
        } else if verbose {
            Level::Trace
        } else {
            Level::Debug
        };

        Self {
            max_level,
            log_file: Mutex::new(Self::open_log_file()),
            target_colors: Mutex::new(HashMap::new()),
        }
    }

    fn open_log_file() -> Option<File> {
        let path = paths::log_file_path()?;
        match OpenOptions::new().create(true).write(true).truncate(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Warning: Failed to open log file at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn color_for_target(&self, target: &str) -> Color {
        let Ok(mut colors) = self.target_colors.lock() else {
            return Color::White;
        };
        let next = colors.len() % TARGET_COLORS.len();
        *colors.entry(target.to_owned()).or_insert(TARGET_COLORS[next])
    }

    fn level_tag(level: Level) -> &'static str {
        match level {
            Level::Error => "[E]",
            Level::Warn => "[W]",
            Level::Info => "[I]",
            Level::Debug => "[D]",
            Level::Trace => "[T]",
        }
    }

    fn short_target<'a>(record: &'a Record) -> &'a str {
        record.target().rsplit("::").next().unwrap_or(record.target())
    }

    fn format_log(&self, record: &Record) -> String {
        let tag = Self::level_tag(record.level());
        let target = Self::short_target(record);
        let target = target.color(self.color_for_target(target)).dimmed();

        match record.level() {
            Level::Error => format!("{} [{}] {}", tag, target, record.args()).red().bold().to_string(),
            Level::Warn => format!("{} [{}] {}", tag, target, record.args()).yellow().bold().to_string(),
            Level::Info => format!("{} [{}] {}", tag.green().bold(), target, record.args()),
            Level::Debug => format!("{} [{}] {}", tag.blue().bold(), target, record.args()),
            Level::Trace => format!("{} [{}] {}", tag.white().bold(), target, record.args()),
        }
    }

    fn format_log_plain(record: &Record) -> String {
        format!(
            "{} [{}] {}",
            Self::level_tag(record.level()),
            Self::short_target(record),
            record.args()
        )
    }
}

impl Log for MosaicLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        eprintln!("{}", self.format_log(record));

        if let Ok(mut file) = self.log_file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = writeln!(file, "{}", Self::format_log_plain(record));
                let _ = file.flush();
            }
        }
    }

    fn flush(&self) {}
}

pub fn init_logger(quiet: bool, verbose: bool) -> Result<(), log::SetLoggerError> {
    let logger = MosaicLogger::new(quiet, verbose);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(LevelFilter::Trace);
    Ok(())
}
