use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid hex color '{0}', expected RRGGBB (e.g. 1a1b26)")]
    InvalidColor(String),

    #[error("cannot read blessings from {path}: {source}")]
    BlessingsRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed blessings file {path}: {source}")]
    BlessingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("blessing list is empty")]
    NoBlessings,

    #[error("cannot create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
