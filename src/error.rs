use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidtagError {
    #[error("Vidtag error: {0}")]
    Generic(String),
    #[error(transparent)]
    Expected(#[from] VidtagExpectedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Tag error: {0}")]
    Tag(String),
}

/// Errors caused by the user's environment or input rather than by a bug.
#[derive(Error, Debug)]
pub enum VidtagExpectedError {
    #[error("{0}")]
    Generic(String),
    #[error("Configuration file not found ({path})")]
    ConfigNotFound { path: PathBuf },
    #[error("Failed to decode configuration file ({path}): {message}")]
    ConfigDecode { path: PathBuf, message: String },
    #[error("Missing key {key} in configuration file ({path})")]
    MissingConfigKey { key: String, path: PathBuf },
    #[error("Invalid value for {key} in configuration file ({path}): {message}")]
    InvalidConfigValue { key: String, path: PathBuf, message: String },
    #[error("No tagging sets could be built from the files in {dir}")]
    NoTaggingSets { dir: PathBuf },
    #[error("Destination directory {path} is unavailable: {message}")]
    DestinationUnavailable { path: PathBuf, message: String },
    #[error("{path} is not a supported filetype")]
    UnsupportedFiletype { path: PathBuf },
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },
    #[error("Invalid media type: {value}")]
    InvalidMediaType { value: String },
}

pub type Result<T> = std::result::Result<T, VidtagError>;
