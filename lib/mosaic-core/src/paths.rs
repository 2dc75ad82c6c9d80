use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "Mosaic";
const LOG_FILE: &str = "mosaic.log";
const CONFIG_FILE: &str = "config.yaml";

/// Where `mosaic.log` goes. The data directory is created on the way; `None`
/// when the platform has no data directory or it cannot be created.
pub fn log_file_path() -> Option<PathBuf> {
    let dir = dirs::data_local_dir()?.join(APP_DIR);
    file_in_created_dir(&dir, LOG_FILE)
}

/// Config file read when `--config` is not given. Not created here.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

fn file_in_created_dir(dir: &Path, file: &str) -> Option<PathBuf> {
    fs::create_dir_all(dir).ok()?;
    Some(dir.join(file))
}
