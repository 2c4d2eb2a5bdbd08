/// The pipeline module sequences the post-processing stages over the working directory:
///
/// 1. Build tagging sets from the directory listing. No sets means there is nothing to do, and the
///    run fails.
/// 2. Tag the audio files of every set.
/// 3. Rename the audio files.
/// 4. Move the audio files (and at most one cover image) into the library. Failing to create the
///    destination directory fails the run.
/// 5. Delete the sidecar files and check that the working directory is empty.
///
/// Everything after step 1, other than destination creation, fails per item: the failure is logged,
/// counted in that stage's report, and the run continues.
use crate::config::Config;
use crate::deleter::delete_sidecars;
use crate::error::{Result, VidtagExpectedError};
use crate::metadata::CollectionMetadata;
use crate::mover::move_files;
use crate::renamer::rename_audio_files;
use crate::tagger::tag_all;
use crate::tagging_sets::{build_tagging_sets, find_collection_metadata, list_working_files};
use chrono::Local;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, warn};

/// What kind of link the downloaded batch came from. Only consulted to decide whether artwork is
/// embedded at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Video,
    PlaylistVideo,
    Playlist,
    Channel,
}

impl MediaType {
    /// Channel batches hold unrelated uploads whose thumbnails are rarely album art.
    pub fn allows_image_embedding(&self) -> bool {
        !matches!(self, MediaType::Channel)
    }
}

impl FromStr for MediaType {
    type Err = VidtagExpectedError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "video" => Ok(MediaType::Video),
            "playlistvideo" => Ok(MediaType::PlaylistVideo),
            "playlist" => Ok(MediaType::Playlist),
            "channel" => Ok(MediaType::Channel),
            _ => Err(VidtagExpectedError::InvalidMediaType { value: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Per-stage success and failure counts. Failures are itemised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub succeeded: usize,
    /// Items the stage had nothing to do for.
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

impl StageReport {
    pub fn fail(&mut self, path: &Path, reason: impl Into<String>) {
        self.failures.push(ItemFailure { path: path.to_path_buf(), reason: reason.into() });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed())?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub tagging_sets: usize,
    pub tagging: StageReport,
    pub renaming: StageReport,
    pub moving: StageReport,
    pub deleting: StageReport,
    pub destination: PathBuf,
    pub cover: Option<PathBuf>,
    /// Files left in the working directory after the run.
    pub residual: Vec<PathBuf>,
}

impl PipelineSummary {
    pub fn log(&self) {
        info!("Processed {} tagging set(s) into {}", self.tagging_sets, self.destination.display());
        for (stage, report) in [("Tagging", &self.tagging), ("Renaming", &self.renaming), ("Moving", &self.moving), ("Deleting", &self.deleting)] {
            info!("{stage}: {report}");
            for failure in &report.failures {
                warn!("  {}: {}", failure.path.display(), failure.reason);
            }
        }
        match &self.cover {
            Some(p) => info!("Cover image: {}", p.display()),
            None => info!("No cover image promoted"),
        }
    }

    pub fn has_failures(&self) -> bool {
        [&self.tagging, &self.renaming, &self.moving, &self.deleting].iter().any(|r| r.failed() > 0) || !self.residual.is_empty()
    }
}

/// Run every post-processing stage over `c.working_directory`.
pub fn run(c: &Config, media_type: MediaType) -> Result<PipelineSummary> {
    let working_directory = &c.working_directory;
    let files = list_working_files(working_directory)?;

    let mut sets = build_tagging_sets(&files);
    if sets.is_empty() {
        error!("No tagging sets found in {}", working_directory.display());
        return Err(VidtagExpectedError::NoTaggingSets { dir: working_directory.clone() }.into());
    }
    info!("Found {} tagging set(s) in {}", sets.len(), working_directory.display());

    let collection_path = find_collection_metadata(&files).cloned();
    let collection = collection_path.as_deref().and_then(|p| match CollectionMetadata::from_file(p) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("Ignoring unreadable collection metadata {}: {e}", p.display());
            None
        }
    });

    let embed_images = c.embed_images && media_type.allows_image_embedding();
    let tagging = tag_all(c, &mut sets, collection.as_ref(), embed_images, Local::now().date_naive());
    let renaming = rename_audio_files(c, &mut sets);
    let moved = move_files(c, &sets, collection.as_ref())?;
    let deleted = delete_sidecars(working_directory, &sets, collection_path.as_deref());

    let summary = PipelineSummary {
        tagging_sets: sets.len(),
        tagging,
        renaming,
        moving: moved.report,
        deleting: deleted.report,
        destination: moved.destination,
        cover: moved.cover,
        residual: deleted.residual,
    };
    summary.log();
    Ok(summary)
}
