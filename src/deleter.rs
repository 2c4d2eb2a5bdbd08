/// The deleter module removes the sidecar files of processed tagging sets once their audio has been
/// tagged and moved, then checks that nothing was left behind in the working directory.
use crate::pipeline::StageReport;
use crate::tagging_sets::{list_working_files, TaggingSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    pub report: StageReport,
    pub residual: Vec<PathBuf>,
}

fn delete_file(p: &Path, report: &mut StageReport) {
    match fs::remove_file(p) {
        Ok(()) => {
            debug!("Deleted {}", p.display());
            report.succeeded += 1;
        }
        // Already gone, e.g. promoted to the cover image.
        Err(e) if e.kind() == io::ErrorKind::NotFound => report.skipped += 1,
        Err(e) => {
            warn!("Failed to delete {}: {e}", p.display());
            report.fail(p, e.to_string());
        }
    }
}

pub fn delete_sidecars(working_directory: &Path, sets: &[TaggingSet], collection_metadata: Option<&Path>) -> DeleteOutcome {
    let mut report = StageReport::default();
    for p in sets.iter().flat_map(|s| s.sidecar_paths()) {
        delete_file(p, &mut report);
    }
    if let Some(p) = collection_metadata {
        delete_file(p, &mut report);
    }
    info!("Deleted {} sidecar file(s)", report.succeeded);

    let residual = residual_files(working_directory);
    DeleteOutcome { report, residual }
}

/// Files still in the working directory. Any are reported as a warning, never as an error.
pub fn residual_files(working_directory: &Path) -> Vec<PathBuf> {
    match list_working_files(working_directory) {
        Ok(files) => {
            if !files.is_empty() {
                warn!("{} file(s) remain in {}:", files.len(), working_directory.display());
                for f in &files {
                    warn!("  {}", f.display());
                }
            }
            files
        }
        Err(e) => {
            warn!("Could not verify that {} is empty: {e}", working_directory.display());
            vec![]
        }
    }
}
