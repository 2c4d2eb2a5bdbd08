/// The tagger module resolves tags for every audio file of every tagging set and writes them.
///
/// Each field is resolved in the same order: an explicit value in the video metadata, then a value
/// detected by the pattern bank, then a computed default. Failures are isolated: an unreadable
/// metadata file skips its set, and a failed write skips only that file.
use crate::audiotags::{AudioTags, CoverArt};
use crate::common::file_name_str;
use crate::config::Config;
use crate::detection::{detect_multiple, detect_single};
use crate::metadata::{non_blank, CollectionMetadata, VideoMetadata};
use crate::pipeline::StageReport;
use crate::tagging_sets::TaggingSet;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const COMPOSER_SEPARATOR: &str = "; ";

// Chapter files written by the downloader's splitter: `<video title> - 001 <chapter title> [<id>].<ext>`
static CHAPTER_FILENAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+ - (\d{3}) (.+?) \[[\w-]{11}\]\.\w+$").unwrap());

/// Chapter number and title from a split chapter's filename.
pub fn parse_chapter_filename(name: &str) -> Option<(u32, String)> {
    let captures = CHAPTER_FILENAME_REGEX.captures(name)?;
    let number = captures[1].parse().ok()?;
    Some((number, captures[2].trim().to_string()))
}

fn owned(s: Option<&str>) -> Option<String> {
    non_blank(s).map(String::from)
}

/// Resolve every tag field for one audio file. `downloaded_on` goes into the provenance comment.
pub fn resolve_tags(c: &Config, video: &VideoMetadata, collection: Option<&CollectionMetadata>, path: &Path, downloaded_on: NaiveDate) -> AudioTags {
    let patterns = &c.tag_detection_patterns;

    let title = owned(video.track.as_deref())
        .or_else(|| detect_single::<String>(video, &patterns.title))
        .unwrap_or_else(|| video.title.clone());

    let artist = owned(video.artist.as_deref()).or_else(|| detect_single::<String>(video, &patterns.artist));

    let album = owned(video.album.as_deref())
        .or_else(|| detect_single::<String>(video, &patterns.album))
        .or_else(|| owned(collection.and_then(|m| m.title_text())));

    let composer = owned(video.composer.as_deref()).or_else(|| detect_multiple(video, &patterns.composer, None, COMPOSER_SEPARATOR));

    let track_number = video.track_number.or(video.playlist_index);

    let year = video.release_year.or_else(|| detect_single::<u32>(video, &patterns.year)).or_else(|| {
        if c.infers_upload_year_for(video.uploader_name()) {
            video.upload_year()
        } else {
            debug!("Not inferring a year from the upload date of {:?}", video.uploader_name());
            None
        }
    });

    AudioTags {
        title: Some(title),
        artist,
        album,
        composer,
        track_number,
        year,
        comment: Some(build_comment(video, collection, downloaded_on)),
        cover: None,
        path: path.to_path_buf(),
    }
}

/// A human-readable note recording where and when the file came from.
pub fn build_comment(video: &VideoMetadata, collection: Option<&CollectionMetadata>, downloaded_on: NaiveDate) -> String {
    let mut lines = vec![format!("Downloaded: {}", downloaded_on.format("%Y-%m-%d"))];
    if let Some(url) = non_blank(video.webpage_url.as_deref()) {
        lines.push(format!("URL: {url}"));
    }
    lines.push(format!("Title: {}", video.title));
    if let Some(uploader) = video.uploader_name() {
        match non_blank(video.uploader_url.as_deref()) {
            Some(url) => lines.push(format!("Uploader: {uploader} ({url})")),
            None => lines.push(format!("Uploader: {uploader}")),
        }
    }
    if let Some(date) = video.upload_date() {
        lines.push(format!("Uploaded: {}", date.format("%Y-%m-%d")));
    }
    if let Some(collection) = collection {
        match non_blank(collection.webpage_url.as_deref()) {
            Some(url) => lines.push(format!("Collection: {} ({url})", collection.title)),
            None => lines.push(format!("Collection: {}", collection.title)),
        }
    }
    if let Some(description) = non_blank(video.description.as_deref()) {
        lines.push(format!("Description: {description}"));
    }
    lines.join("\n")
}

/// Delete the largest audio file of a split-chapter set. It is the unsplit source the chapters were
/// cut from. Returns the removed path.
pub fn delete_presplit_source(set: &mut TaggingSet, report: &mut StageReport) -> Option<PathBuf> {
    let (index, size) = set
        .audio_file_paths
        .iter()
        .enumerate()
        .filter_map(|(i, p)| fs::metadata(p).ok().map(|m| (i, m.len())))
        .max_by_key(|(_, len)| *len)?;
    let largest = set.audio_file_paths[index].clone();
    match fs::remove_file(&largest) {
        Ok(()) => {
            info!("Deleted pre-split source {} ({size} bytes)", file_name_str(&largest));
            set.audio_file_paths.remove(index);
            Some(largest)
        }
        Err(e) => {
            warn!("Failed to delete pre-split source {}: {e}", largest.display());
            report.fail(&largest, format!("failed to delete pre-split source: {e}"));
            None
        }
    }
}

/// Tag every set in order. Sets are mutated only to drop a deleted pre-split source.
pub fn tag_all(c: &Config, sets: &mut [TaggingSet], collection: Option<&CollectionMetadata>, embed_images: bool, downloaded_on: NaiveDate) -> StageReport {
    let mut report = StageReport::default();
    for set in sets.iter_mut() {
        tag_set(c, set, collection, embed_images, downloaded_on, &mut report);
    }
    report
}

fn tag_set(c: &Config, set: &mut TaggingSet, collection: Option<&CollectionMetadata>, embed_images: bool, downloaded_on: NaiveDate, report: &mut StageReport) {
    let video = match VideoMetadata::from_file(&set.json_file_path) {
        Ok(v) => v,
        Err(e) => {
            warn!("Skipping {}: could not read {}: {e}", set.resource_id, set.json_file_path.display());
            report.fail(&set.json_file_path, e.to_string());
            return;
        }
    };
    info!("Tagging {} ({:?})", set.resource_id, video.title);

    let split = set.audio_file_paths.len() > 1;
    if split {
        delete_presplit_source(set, report);
    }

    // Art is only embedded in a lone file; chapters of one video would all get the same picture.
    let cover = if embed_images && set.audio_file_paths.len() == 1 && c.embeds_images_for(video.uploader_name()) {
        match CoverArt::from_file(&set.image_file_path) {
            Ok(cover) => Some(cover),
            Err(e) => {
                warn!("Not embedding {}: {e}", set.image_file_path.display());
                None
            }
        }
    } else {
        None
    };

    for path in &set.audio_file_paths {
        let mut tags = resolve_tags(c, &video, collection, path, downloaded_on);
        if split {
            if let Some((number, title)) = parse_chapter_filename(&file_name_str(path)) {
                tags.title = Some(title);
                tags.track_number = Some(number);
            }
        }
        tags.cover = cover.clone();

        match tags.flush() {
            Ok(()) => {
                debug!("Wrote tags to {}: {:?} / {:?} / {:?}", path.display(), tags.title, tags.artist, tags.album);
                report.succeeded += 1;
            }
            Err(e) => {
                warn!("Failed to tag {}: {e}", path.display());
                report.fail(path, e.to_string());
            }
        }
    }
}
