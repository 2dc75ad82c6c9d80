use crate::config::ConfigError;
use crate::session::SessionError;
use crate::tree::serialization::SerializationError;
use crate::tree::LayoutError;

pub mod config;
pub mod geometry;
pub mod paths;
pub mod session;
pub mod tree;

pub use config::{Config, ConfigRef};
pub use session::MosaicBackend;

pub fn version() -> &'static str {
    option_env!("VERSION").unwrap_or("v0.0.0-dev")
}

#[derive(Debug)]
pub enum MosaicFatalError {
    Error(String),
    ConfigError(ConfigError),
    LayoutError(LayoutError),
    SerializationError(SerializationError),
    SessionError(SessionError),
}

pub type MosaicResult<T> = Result<T, MosaicFatalError>;

impl From<ConfigError> for MosaicFatalError {
    fn from(error: ConfigError) -> Self {
        MosaicFatalError::ConfigError(error)
    }
}

impl From<LayoutError> for MosaicFatalError {
    fn from(error: LayoutError) -> Self {
        MosaicFatalError::LayoutError(error)
    }
}

impl From<SerializationError> for MosaicFatalError {
    fn from(error: SerializationError) -> Self {
        MosaicFatalError::SerializationError(error)
    }
}

impl From<SessionError> for MosaicFatalError {
    fn from(error: SessionError) -> Self {
        MosaicFatalError::SessionError(error)
    }
}

impl From<&str> for MosaicFatalError {
    fn from(value: &str) -> Self {
        MosaicFatalError::Error(value.to_owned())
    }
}

impl From<String> for MosaicFatalError {
    fn from(error: String) -> Self {
        MosaicFatalError::Error(error)
    }
}

impl std::fmt::Display for MosaicFatalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MosaicFatalError::Error(message) => write!(f, "{message}"),
            MosaicFatalError::ConfigError(e) => write!(f, "{e}"),
            MosaicFatalError::LayoutError(e) => write!(f, "{e}"),
            MosaicFatalError::SerializationError(e) => write!(f, "{e}"),
            MosaicFatalError::SessionError(e) => write!(f, "{e}"),
        }
    }
}
