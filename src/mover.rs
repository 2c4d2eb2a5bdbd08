/// The mover module relocates finished audio files into the library at
/// `<move_to_directory>/<uploader>/<collection title>/` and promotes at most one image to the
/// directory's cover.
use crate::common::{file_name_str, move_file, sanitize_dirname};
use crate::config::Config;
use crate::error::{Result, VidtagExpectedError};
use crate::metadata::{CollectionMetadata, VideoMetadata};
use crate::pipeline::StageReport;
use crate::tagging_sets::{classify, list_working_files, FileKind, TaggingSet};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const COVER_FILENAME: &str = "cover.jpg";
pub const UNKNOWN_UPLOADER: &str = "Unknown Uploader";

lazy_static! {
    // Playlist thumbnails carry the playlist's identifier, which is longer than a video's.
    static ref PLAYLIST_IMAGE_REGEX: Regex = Regex::new(r"\[[\w-]{12,}\]\.jpg$").unwrap();
    static ref TOPIC_SUFFIX_REGEX: Regex = Regex::new(r"\s+-\s+Topic$").unwrap();
}

#[derive(Debug, Clone, Default)]
pub struct MoveOutcome {
    pub report: StageReport,
    pub destination: PathBuf,
    pub cover: Option<PathBuf>,
}

/// The name of the uploader directory, taken from the first available of: the collection's
/// uploader, the uploader of the first set whose metadata names one, the collection's title.
pub fn uploader_directory_name(c: &Config, sets: &[TaggingSet], collection: Option<&CollectionMetadata>) -> String {
    let video_uploader = || {
        sets.iter().find_map(|set| match VideoMetadata::from_file(&set.json_file_path) {
            Ok(v) => v.uploader_name().map(String::from),
            Err(e) => {
                debug!("Could not read uploader from {}: {e}", set.json_file_path.display());
                None
            }
        })
    };

    let name = collection
        .and_then(|m| m.uploader_name())
        .map(String::from)
        .or_else(video_uploader)
        .or_else(|| collection.and_then(|m| m.title_text()).map(String::from))
        .unwrap_or_else(|| UNKNOWN_UPLOADER.to_string());
    let name = TOPIC_SUFFIX_REGEX.replace(&name, "");
    let name = sanitize_dirname(&name, c.max_filename_bytes, true);
    if name.is_empty() {
        UNKNOWN_UPLOADER.to_string()
    } else {
        name
    }
}

pub fn destination_directory(c: &Config, sets: &[TaggingSet], collection: Option<&CollectionMetadata>) -> PathBuf {
    let mut dir = c.move_to_directory.join(uploader_directory_name(c, sets, collection));
    if let Some(title) = collection.and_then(|m| m.title_text()) {
        let title = sanitize_dirname(title, c.max_filename_bytes, true);
        if !title.is_empty() {
            dir.push(title);
        }
    }
    dir
}

/// Pick the image to promote to the cover, if any can be picked without guessing:
///
/// 1. an image named after a playlist identifier;
/// 2. otherwise, when several audio files were moved and exactly one image remains, that image;
/// 3. otherwise nothing.
pub fn select_cover_image(images: &[PathBuf], audio_files_moved: usize) -> Option<&PathBuf> {
    if let Some(playlist_image) = images.iter().find(|p| PLAYLIST_IMAGE_REGEX.is_match(&file_name_str(p))) {
        return Some(playlist_image);
    }
    if audio_files_moved > 1 && images.len() == 1 {
        return images.first();
    }
    None
}

/// Move every audio file of every set into the destination directory, then promote a cover image.
/// Only failing to create the destination directory is an error; individual moves are counted.
pub fn move_files(c: &Config, sets: &[TaggingSet], collection: Option<&CollectionMetadata>) -> Result<MoveOutcome> {
    let destination = destination_directory(c, sets, collection);
    fs::create_dir_all(&destination).map_err(|e| VidtagExpectedError::DestinationUnavailable { path: destination.clone(), message: e.to_string() })?;
    info!("Moving files to {}", destination.display());

    let mut report = StageReport::default();
    for path in sets.iter().flat_map(|s| s.audio_file_paths.iter()) {
        let Some(name) = path.file_name() else {
            report.fail(path, "not a file path");
            continue;
        };
        let target = destination.join(name);
        match move_file(path, &target) {
            Ok(()) => {
                debug!("Moved {} to {}", path.display(), target.display());
                report.succeeded += 1;
            }
            Err(e) => {
                warn!("Failed to move {}: {e}", path.display());
                report.fail(path, e.to_string());
            }
        }
    }

    let cover = promote_cover_image(&c.working_directory, &destination, report.succeeded, &mut report);
    Ok(MoveOutcome { report, destination, cover })
}

fn promote_cover_image(working_directory: &Path, destination: &Path, audio_files_moved: usize, report: &mut StageReport) -> Option<PathBuf> {
    let images: Vec<PathBuf> = match list_working_files(working_directory) {
        Ok(files) => files.into_iter().filter(|p| classify(p) == FileKind::Image).collect(),
        Err(e) => {
            warn!("Could not list images in {}: {e}", working_directory.display());
            return None;
        }
    };

    let Some(image) = select_cover_image(&images, audio_files_moved) else {
        debug!("No unambiguous cover image among {} image(s)", images.len());
        return None;
    };

    let target = destination.join(COVER_FILENAME);
    if target.exists() {
        info!("Keeping existing {}", target.display());
        return None;
    }
    match move_file(image, &target) {
        Ok(()) => {
            info!("Promoted {} to {}", file_name_str(image), target.display());
            Some(target)
        }
        Err(e) => {
            warn!("Failed to promote {} to cover: {e}", image.display());
            report.fail(image, e.to_string());
            None
        }
    }
}
