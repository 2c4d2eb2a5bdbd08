/// The common module is our ugly grab bag of common toys. Though a fully generalized common module
/// is _typically_ a bad idea, we have few enough things in it that it's OK for now.
use crate::error::{Result, VidtagError, VidtagExpectedError};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, EnvFilter};
use unicode_normalization::UnicodeNormalization;

/// Deduplicate while preserving first-seen order.
pub fn uniq<T: Clone + Eq + Hash>(xs: Vec<T>) -> Vec<T> {
    let mut rv = Vec::new();
    let mut seen = HashSet::new();
    for x in xs {
        if seen.insert(x.clone()) {
            rv.push(x);
        }
    }
    rv
}

static ILLEGAL_FS_CHARS_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_illegal_fs_chars_regex() -> &'static Regex {
    ILLEGAL_FS_CHARS_REGEX.get_or_init(|| Regex::new(r#"[:\?<>\\\*\|"/]+"#).unwrap())
}

/// Cut `s` to at most `max_bytes` bytes without splitting a character.
fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

pub fn sanitize_dirname(name: &str, max_filename_bytes: usize, enforce_maxlen: bool) -> String {
    let mut name = get_illegal_fs_chars_regex().replace_all(name, "_").trim().to_string();
    if enforce_maxlen {
        name = truncate_bytes(&name, max_filename_bytes).trim().to_string();
    }
    name.nfc().collect::<String>()
}

pub fn sanitize_filename(name: &str, max_filename_bytes: usize, enforce_maxlen: bool) -> String {
    let mut name = get_illegal_fs_chars_regex().replace_all(name, "_").to_string();

    if enforce_maxlen {
        // Preserve the extension
        let (stem, ext) = match name.rfind('.') {
            Some(pos) => {
                let (s, e) = name.split_at(pos);
                (s.to_string(), e.to_string())
            }
            None => (name.clone(), String::new()),
        };

        // But ignore if the extension is longer than 6 bytes
        let (stem, ext) = if ext.len() > 6 { (name.clone(), String::new()) } else { (stem, ext) };

        name = format!("{}{}", truncate_bytes(&stem, max_filename_bytes).trim(), ext);
    }

    name.nfc().collect::<String>()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationForm {
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

pub fn normalize(s: &str, form: Option<NormalizationForm>) -> String {
    match form {
        None => s.to_string(),
        Some(NormalizationForm::Nfc) => s.nfc().collect(),
        Some(NormalizationForm::Nfd) => s.nfd().collect(),
        Some(NormalizationForm::Nfkc) => s.nfkc().collect(),
        Some(NormalizationForm::Nfkd) => s.nfkd().collect(),
    }
}

/// Move a file, falling back to copy-and-remove when a plain rename is impossible (for example
/// across filesystems). Refuses to replace an existing destination.
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        return Err(VidtagError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dst.display()),
        )));
    }
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(VidtagExpectedError::FileNotFound { path: src.to_path_buf() }.into()),
        Err(_) => {
            fs::copy(src, dst)?;
            fs::remove_file(src)?;
            Ok(())
        }
    }
}

/// Lowercased extension of a path including the leading dot, or an empty string.
pub fn dotted_extension(p: &Path) -> String {
    p.extension().and_then(|s| s.to_str()).map(|s| format!(".{}", s.to_lowercase())).unwrap_or_default()
}

pub fn file_name_str(p: &Path) -> String {
    p.file_name().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File,
}

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

fn log_dir() -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "vidtag")?;
    let dir = if cfg!(target_os = "macos") {
        proj_dirs.cache_dir()
    } else {
        proj_dirs.state_dir().unwrap_or(proj_dirs.cache_dir())
    };
    Some(dir.to_path_buf())
}

/// Install the global tracing subscriber. When logging to a file, the returned guard must be held
/// until exit or buffered lines are lost.
pub fn initialize_logging(output: LogOutput, verbose: bool) -> Result<Option<WorkerGuard>> {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(None);
    }

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match output {
        LogOutput::Stderr => {
            let subscriber = fmt::Subscriber::builder().with_env_filter(env_filter).with_target(verbose).with_writer(io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber).map_err(|e| VidtagError::Generic(format!("Failed to install logger: {e}")))?;
            Ok(None)
        }
        LogOutput::File => {
            let dir = log_dir().ok_or_else(|| VidtagError::Generic("Failed to get project directories".to_string()))?;
            fs::create_dir_all(&dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix("vidtag")
                .filename_suffix("log")
                .build(&dir)
                .map_err(|e| VidtagError::Generic(format!("Failed to open log file in {}: {e}", dir.display())))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).map_err(|e| VidtagError::Generic(format!("Failed to install logger: {e}")))?;
            Ok(Some(guard))
        }
    }
}
