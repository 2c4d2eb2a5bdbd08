/// The config module provides the config schema and parsing logic.
///
/// We take special care to optimize the configuration experience: detailed errors are returned when
/// an invalid configuration is detected, and warnings are emitted when unrecognized keys are found.
use crate::common::NormalizationForm;
use crate::error::{Result, VidtagExpectedError};
use crate::patterns::TagDetectionPatterns;
use crate::renamer::{default_rename_patterns, RenamePattern};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the downloader leaves its output. Expected to be empty once a run finishes.
    pub working_directory: PathBuf,
    /// Root of the curated library.
    pub move_to_directory: PathBuf,
    pub verbose_output: bool,
    pub embed_images: bool,
    pub do_not_embed_image_uploaders: Vec<String>,
    pub ignore_upload_year_uploaders: Vec<String>,
    pub normalize_filenames: Option<NormalizationForm>,
    pub max_filename_bytes: usize,
    pub rename_patterns: Vec<RenamePattern>,
    pub tag_detection_patterns: TagDetectionPatterns,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            working_directory: PathBuf::new(),
            move_to_directory: PathBuf::new(),
            verbose_output: false,
            embed_images: true,
            do_not_embed_image_uploaders: vec![],
            ignore_upload_year_uploaders: vec![],
            normalize_filenames: Some(NormalizationForm::Nfc),
            max_filename_bytes: 180,
            rename_patterns: default_rename_patterns(),
            tag_detection_patterns: TagDetectionPatterns::default(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vidtag").map(|d| d.config_dir().join("config.toml"))
}

fn expand_path(s: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(s).into_owned())
}

/// Removes keys from `data` as they are read so that whatever remains can be reported as unknown.
struct Reader<'a> {
    path: &'a Path,
    data: Table,
}

impl Reader<'_> {
    fn invalid(&self, key: &str, message: impl Into<String>) -> VidtagExpectedError {
        VidtagExpectedError::InvalidConfigValue { key: key.to_string(), path: self.path.to_path_buf(), message: message.into() }
    }

    fn required_path(&mut self, key: &str) -> Result<PathBuf> {
        match self.data.remove(key) {
            None => Err(VidtagExpectedError::MissingConfigKey { key: key.to_string(), path: self.path.to_path_buf() }.into()),
            Some(Value::String(s)) => Ok(expand_path(&s)),
            Some(_) => Err(self.invalid(key, "must be a path").into()),
        }
    }

    fn bool(&mut self, key: &str, default: bool) -> Result<bool> {
        match self.data.remove(key) {
            None => Ok(default),
            Some(Value::Boolean(b)) => Ok(b),
            Some(v) => Err(self.invalid(key, format!("must be a bool: got {}", v.type_str())).into()),
        }
    }

    fn usize(&mut self, key: &str, default: usize) -> Result<usize> {
        match self.data.remove(key) {
            None => Ok(default),
            Some(Value::Integer(i)) => usize::try_from(i).map_err(|_| self.invalid(key, format!("must be a non-negative integer: got {i}")).into()),
            Some(v) => Err(self.invalid(key, format!("must be an int: got {}", v.type_str())).into()),
        }
    }

    fn string_list(&mut self, key: &str) -> Result<Vec<String>> {
        match self.data.remove(key) {
            None => Ok(vec![]),
            Some(Value::Array(values)) => values
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s),
                    other => Err(self.invalid(key, format!("each entry must be of type str: got {}", other.type_str())).into()),
                })
                .collect(),
            Some(v) => Err(self.invalid(key, format!("must be a list[str]: got {}", v.type_str())).into()),
        }
    }

    fn normalization(&mut self, key: &str, default: Option<NormalizationForm>) -> Result<Option<NormalizationForm>> {
        match self.data.remove(key) {
            None => Ok(default),
            Some(Value::Boolean(false)) => Ok(None),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("none") => Ok(None),
            Some(Value::String(s)) => match s.to_lowercase().as_str() {
                "nfc" => Ok(Some(NormalizationForm::Nfc)),
                "nfd" => Ok(Some(NormalizationForm::Nfd)),
                "nfkc" => Ok(Some(NormalizationForm::Nfkc)),
                "nfkd" => Ok(Some(NormalizationForm::Nfkd)),
                _ => Err(self.invalid(key, format!("must be one of nfc, nfd, nfkc, nfkd, none: got {s}")).into()),
            },
            Some(v) => Err(self.invalid(key, format!("must be a string: got {}", v.type_str())).into()),
        }
    }

    fn structured<T: DeserializeOwned>(&mut self, key: &str, default: impl FnOnce() -> T) -> Result<T> {
        match self.data.remove(key) {
            None => Ok(default()),
            Some(v) => v.try_into().map_err(|e: toml::de::Error| self.invalid(key, e.message().to_string()).into()),
        }
    }
}

impl Config {
    /// Parse the configuration file at `config_path_override`, or at the default location.
    pub fn parse(config_path_override: Option<&Path>) -> Result<Config> {
        let cfgpath = match config_path_override {
            Some(p) => p.to_path_buf(),
            None => default_config_path().ok_or_else(|| VidtagExpectedError::Generic("Failed to resolve the configuration directory".to_string()))?,
        };

        let cfgtext = fs::read_to_string(&cfgpath).map_err(|_| VidtagExpectedError::ConfigNotFound { path: cfgpath.clone() })?;
        Config::parse_str(&cfgpath, &cfgtext)
    }

    pub fn parse_str(cfgpath: &Path, cfgtext: &str) -> Result<Config> {
        let data: Table = cfgtext.parse().map_err(|e: toml::de::Error| VidtagExpectedError::ConfigDecode { path: cfgpath.to_path_buf(), message: e.to_string() })?;

        let defaults = Config::default();
        let mut r = Reader { path: cfgpath, data };

        let config = Config {
            working_directory: r.required_path("working_directory")?,
            move_to_directory: r.required_path("move_to_directory")?,
            verbose_output: r.bool("verbose_output", defaults.verbose_output)?,
            embed_images: r.bool("embed_images", defaults.embed_images)?,
            do_not_embed_image_uploaders: r.string_list("do_not_embed_image_uploaders")?,
            ignore_upload_year_uploaders: r.string_list("ignore_upload_year_uploaders")?,
            normalize_filenames: r.normalization("normalize_filenames", defaults.normalize_filenames)?,
            max_filename_bytes: r.usize("max_filename_bytes", defaults.max_filename_bytes)?,
            rename_patterns: r.structured("rename_patterns", default_rename_patterns)?,
            tag_detection_patterns: r.structured("tag_detection_patterns", TagDetectionPatterns::default)?,
        };

        for key in r.data.keys() {
            warn!("Unrecognized key {key} in configuration file ({})", cfgpath.display());
        }

        Ok(config)
    }

    pub fn embeds_images_for(&self, uploader: Option<&str>) -> bool {
        !uploader.is_some_and(|u| self.do_not_embed_image_uploaders.iter().any(|x| x == u))
    }

    pub fn infers_upload_year_for(&self, uploader: Option<&str>) -> bool {
        !uploader.is_some_and(|u| self.ignore_upload_year_uploaders.iter().any(|x| x == u))
    }
}
