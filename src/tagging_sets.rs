/// The tagging_sets module correlates the flat listing of the working directory into tagging sets:
/// the audio files, metadata sidecar and thumbnail that share one video's resource identifier.
///
/// Groups that do not have exactly one metadata file, exactly one image and at least one audio file
/// are dropped silently. A listing that yields no sets at all is the caller's problem to report.
use crate::common::file_name_str;
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub const METADATA_EXTENSION: &str = ".info.json";
pub const IMAGE_EXTENSION: &str = ".jpg";
pub const SUPPORTED_AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".m4a", ".ogg", ".opus", ".flac"];

pub const RESOURCE_ID_LEN: usize = 11;

lazy_static! {
    // The identifier is the last 11-character bracketed token in the name. Chapter files produced
    // by splitting carry the same token as their source.
    static ref RESOURCE_ID_REGEX: Regex = Regex::new(r"^.*\[([\w-]{11})\][^\[\]]*$").unwrap();
    // Playlist and channel identifiers are longer than video identifiers.
    static ref COLLECTION_METADATA_REGEX: Regex = Regex::new(r"\[[\w-]{12,}\]\.info\.json$").unwrap();
}

/// The opaque identifier of one source video, as embedded in all of its filenames.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn parse(s: &str) -> Option<ResourceId> {
        let valid = s.len() == RESOURCE_ID_LEN && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        valid.then(|| ResourceId(s.to_string()))
    }

    /// Extract the identifier embedded in a filename, if any.
    pub fn from_filename(name: &str) -> Option<ResourceId> {
        let captures = RESOURCE_ID_REGEX.captures(name)?;
        ResourceId::parse(captures.get(1)?.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Audio,
    Metadata,
    Image,
    Other,
}

pub fn classify(p: &Path) -> FileKind {
    let name = file_name_str(p).to_lowercase();
    if name.ends_with(METADATA_EXTENSION) {
        FileKind::Metadata
    } else if name.ends_with(IMAGE_EXTENSION) {
        FileKind::Image
    } else if SUPPORTED_AUDIO_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
        FileKind::Audio
    } else {
        FileKind::Other
    }
}

pub fn is_collection_metadata(p: &Path) -> bool {
    COLLECTION_METADATA_REGEX.is_match(&file_name_str(p))
}

/// The files belonging to one source video. Every path embeds `resource_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggingSet {
    pub resource_id: ResourceId,
    /// Never empty. Kept sorted.
    pub audio_file_paths: Vec<PathBuf>,
    pub json_file_path: PathBuf,
    pub image_file_path: PathBuf,
}

impl TaggingSet {
    pub fn sidecar_paths(&self) -> [&Path; 2] {
        [&self.json_file_path, &self.image_file_path]
    }

    pub fn all_paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self.audio_file_paths.iter().map(PathBuf::as_path).collect();
        paths.extend(self.sidecar_paths());
        paths
    }
}

#[derive(Default)]
struct Group {
    audio: Vec<PathBuf>,
    json: Vec<PathBuf>,
    image: Vec<PathBuf>,
}

/// Group paths by resource identifier and keep the well-formed groups. The result is ordered by
/// identifier.
pub fn build_tagging_sets(paths: &[PathBuf]) -> Vec<TaggingSet> {
    let mut groups: BTreeMap<ResourceId, Group> = BTreeMap::new();
    for p in paths {
        let Some(id) = ResourceId::from_filename(&file_name_str(p)) else {
            continue;
        };
        let group = groups.entry(id).or_default();
        match classify(p) {
            FileKind::Audio => group.audio.push(p.clone()),
            FileKind::Metadata => group.json.push(p.clone()),
            FileKind::Image => group.image.push(p.clone()),
            FileKind::Other => {}
        }
    }

    let mut sets = Vec::new();
    for (id, mut group) in groups {
        if group.audio.is_empty() || group.json.len() != 1 || group.image.len() != 1 {
            debug!(
                "Dropping files for {id}: {} audio, {} metadata, {} image",
                group.audio.len(),
                group.json.len(),
                group.image.len()
            );
            continue;
        }
        group.audio.sort();
        sets.push(TaggingSet {
            resource_id: id,
            audio_file_paths: group.audio,
            json_file_path: group.json.remove(0),
            image_file_path: group.image.remove(0),
        });
    }
    sets
}

/// The regular files directly inside `dir`, sorted.
pub fn list_working_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => io.into(),
            None => crate::error::VidtagError::Generic(format!("Failed to list {}", dir.display())),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// The collection sidecar in a listing. When there are several, the first is used.
pub fn find_collection_metadata(paths: &[PathBuf]) -> Option<&PathBuf> {
    let mut found = paths.iter().filter(|p| is_collection_metadata(p));
    let first = found.next()?;
    let extra = found.count();
    if extra > 0 {
        tracing::warn!("Found {} collection metadata files; using {}", extra + 1, first.display());
    }
    Some(first)
}
