use crate::paths;
use crate::tree::MosaicDirection;
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

pub type ConfigRef = Rc<Config>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine default config directory")]
    NoConfigDir,

    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The path the config file was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Pixels the pointer must travel after a press before a drag starts
    pub drag_threshold: u32,
    /// Width in pixels of the grab area centered on each split bar
    pub resize_handle_width: u32,
    /// Smallest share (percent) either side of a split can be resized to
    pub min_split_percentage: f64,
    /// Split percentage given to newly created splits
    pub default_split_percentage: f64,
    /// Fraction of the target pane covered by the drop preview
    pub drop_preview_ratio: f32,
    /// Direction used when a pane is inserted next to the root
    pub root_split_direction: MosaicDirection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            drag_threshold: 5,
            resize_handle_width: 8,
            min_split_percentage: 10.0,
            default_split_percentage: 50.0,
            drop_preview_ratio: 0.5,
            root_split_direction: MosaicDirection::Row,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&Path>, save: bool) -> ConfigResult<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => paths::default_config_path().ok_or(ConfigError::NoConfigDir)?,
        };

        if !path.exists() {
            Self::create_default_config_file(&path)?;
            trace!("Created default config file at: {}", path.display());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let mut config = Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate()?;
        config.config_path = Some(path.clone());

        // Write back so the file lists every field, including ones added since it was created
        if save {
            if let Err(e) = config.save_to_file(&path) {
                warn!("Failed to update config file with missing fields: {e}");
            }
        }

        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..50.0).contains(&self.min_split_percentage) {
            return Err(ConfigError::Invalid {
                field: "min_split_percentage",
                reason: format!("{} is not in [0, 50)", self.min_split_percentage),
            });
        }
        if !(0.0..=100.0).contains(&self.default_split_percentage) {
            return Err(ConfigError::Invalid {
                field: "default_split_percentage",
                reason: format!("{} is not in [0, 100]", self.default_split_percentage),
            });
        }
        if !(0.0..=1.0).contains(&self.drop_preview_ratio) {
            return Err(ConfigError::Invalid {
                field: "drop_preview_ratio",
                reason: format!("{} is not in [0, 1]", self.drop_preview_ratio),
            });
        }
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let contents = serde_yaml::to_string(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn create_default_config_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Config::default().save_to_file(path)
    }
}
