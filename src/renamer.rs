/// The renamer module rewrites audio filenames through an ordered list of rename rules.
///
/// Each rule rewrites at most one match, and every rule sees the output of the rule before it, so
/// the order of the list is part of its meaning. A rule that strips the trailing resource id has to
/// run before the rule that strips the video suffixes it leaves exposed. Separators and whitespace
/// are tidied across the whole name after the fold.
use crate::common::{normalize, sanitize_filename};
use crate::config::Config;
use crate::pipeline::StageReport;
use crate::tagging_sets::TaggingSet;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{(\d+)\}").unwrap();
    static ref FULL_WIDTH_BAR_REGEX: Regex = Regex::new(r"\s*｜\s*").unwrap();
    static ref REPEATED_WHITESPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    static ref WHITESPACE_BEFORE_EXTENSION_REGEX: Regex = Regex::new(r"\s+(\.\w{3,5})$").unwrap();
}

/// A rename rule. `replacement` may reference capture groups of `pattern` as `{1}`, `{2}`, and so
/// on; `{0}` is the whole match.
#[derive(Debug, Clone, Deserialize)]
pub struct RenamePattern {
    #[serde(with = "serde_regex")]
    pub pattern: Regex,
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub description: String,
}

impl RenamePattern {
    pub fn new(pattern: Regex, replacement: &str, description: &str) -> RenamePattern {
        RenamePattern { pattern, replacement: replacement.to_string(), description: description.to_string() }
    }

    fn builtin(pattern: &str, replacement: &str, description: &str) -> RenamePattern {
        RenamePattern::new(Regex::new(pattern).unwrap(), replacement, description)
    }
}

pub fn default_rename_patterns() -> Vec<RenamePattern> {
    vec![
        RenamePattern::builtin(r"(?:\s*\[[\w-]{11}\])+\s*(\.\w{3,5})$", "{1}", "Remove the trailing resource id"),
        RenamePattern::builtin(
            r"(?i)(?:\s*[\(\[](?:official\s+)?(?:(?:music|lyric)\s+)?(?:video|audio|visualizer|lyrics?)[\)\]])+\s*(\.\w{3,5})$",
            "{1}",
            "Remove trailing video-only suffixes such as (Official Video)",
        ),
    ]
}

/// Substitute `{N}` placeholders with the corresponding groups of `captures`. Groups that did not
/// participate in the match expand to nothing.
pub fn expand_replacement(template: &str, captures: &Captures) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |placeholder: &Captures| {
            let index: usize = placeholder[1].parse().unwrap_or(usize::MAX);
            captures.get(index).map_or("", |m| m.as_str()).to_string()
        })
        .into_owned()
}

/// Fold `filename` through every rule in order. Each rule is matched once against the current
/// name and its match is replaced in place.
pub fn apply_rename_patterns(filename: &str, patterns: &[RenamePattern]) -> String {
    patterns.iter().fold(filename.to_string(), |current, rule| {
        let rewritten = rule.pattern.captures(&current).and_then(|captures| {
            let m = captures.get(0)?;
            let replacement = expand_replacement(&rule.replacement, &captures);
            Some(format!("{}{}{}", &current[..m.start()], replacement, &current[m.end()..]))
        });
        match rewritten {
            Some(name) => {
                debug!("Rule {:?} rewrote {:?} to {:?}", rule.description, current, name);
                name
            }
            None => current,
        }
    })
}

/// Replace full-width vertical bars with a dash, collapse whitespace runs and drop whitespace
/// before the extension, everywhere in the name.
pub fn tidy_filename(filename: &str) -> String {
    let tidied = FULL_WIDTH_BAR_REGEX.replace_all(filename, " - ");
    let tidied = REPEATED_WHITESPACE_REGEX.replace_all(&tidied, " ");
    WHITESPACE_BEFORE_EXTENSION_REGEX.replace(&tidied, "$1").into_owned()
}

/// The final name for `filename`: rules applied, tidied, then sanitised and normalised.
pub fn renamed_filename(filename: &str, c: &Config) -> String {
    let renamed = apply_rename_patterns(filename, &c.rename_patterns);
    let renamed = tidy_filename(&renamed);
    let renamed = sanitize_filename(&renamed, c.max_filename_bytes, true);
    normalize(&renamed, c.normalize_filenames)
}

/// Rename every audio file of every set in place, recording the new paths in the sets.
pub fn rename_audio_files(c: &Config, sets: &mut [TaggingSet]) -> StageReport {
    let mut report = StageReport::default();
    for set in sets.iter_mut() {
        for path in set.audio_file_paths.iter_mut() {
            let Some(old_name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                warn!("Not renaming {}: the filename is not valid UTF-8", path.display());
                report.skipped += 1;
                continue;
            };
            let new_name = renamed_filename(&old_name, c);
            if new_name == old_name || new_name.is_empty() {
                report.skipped += 1;
                continue;
            }

            let target: PathBuf = path.with_file_name(&new_name);
            if target.exists() {
                warn!("Not renaming {old_name:?}: {new_name:?} already exists");
                report.fail(path, format!("{} already exists", target.display()));
                continue;
            }
            match fs::rename(&*path, &target) {
                Ok(()) => {
                    info!("Renamed {old_name:?} to {new_name:?}");
                    *path = target;
                    report.succeeded += 1;
                }
                Err(e) => {
                    warn!("Failed to rename {old_name:?}: {e}");
                    report.fail(path, e.to_string());
                }
            }
        }
        set.audio_file_paths.sort();
    }
    report
}
