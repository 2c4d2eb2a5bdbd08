use crate::config::Config;
use crate::metadata::VideoMetadata;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

pub fn init() -> TempDir {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")))
            .with_test_writer()
            .try_init();
    });
    TempDir::new().expect("failed to create temp dir")
}

// Creates a test config with an empty working directory and library, and no files.
pub fn config() -> (Config, TempDir) {
    let temp_dir = init();
    let base_path = temp_dir.path();

    fs::create_dir_all(base_path.join("work")).expect("failed to create working dir");
    fs::create_dir_all(base_path.join("library")).expect("failed to create library dir");

    let config = Config {
        working_directory: base_path.join("work"),
        move_to_directory: base_path.join("library"),
        ..Config::default()
    };
    (config, temp_dir)
}

pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, contents).expect("failed to write file");
    p
}

pub fn video_json(id: &str, title: &str, uploader: &str, description: &str) -> String {
    serde_json::json!({
        "id": id,
        "title": title,
        "uploader": uploader,
        "uploader_url": format!("https://www.youtube.com/@{}", uploader.replace(' ', "")),
        "webpage_url": format!("https://www.youtube.com/watch?v={id}"),
        "upload_date": "20190612",
        "description": description,
        "duration": 215,
    })
    .to_string()
}

pub fn video(title: &str, description: &str) -> VideoMetadata {
    VideoMetadata {
        id: "dQw4w9WgXcQ".to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        uploader: Some("Some Uploader".to_string()),
        upload_date: Some("20190612".to_string()),
        ..Default::default()
    }
}

/// The description the distributors attach to auto-generated uploads.
pub const AUTO_GENERATED_DESCRIPTION: &str = "Provided to YouTube by Sample Distribution

Morning Light · The Examples · Guest Player

Greatest Hits

℗ 2018 Example Records

Released on: 2018-03-09

Composer: Ana Example
Composer: Bo Example
Music: Ana Example

Auto-generated by YouTube.";

/// Lay out one well-formed tagging set in `dir`: a metadata sidecar, a thumbnail and one audio
/// file per entry of `audio` (filename suffix, size in bytes).
pub fn write_tagging_set(dir: &Path, stem: &str, id: &str, json: &str, audio: &[(&str, usize)]) -> Vec<PathBuf> {
    write_file(dir, &format!("{stem} [{id}].info.json"), json.as_bytes());
    write_file(dir, &format!("{stem} [{id}].jpg"), b"\xff\xd8\xff\xe0fake jpeg");
    audio.iter().map(|(name, size)| write_file(dir, &format!("{name} [{id}].mp3"), &vec![0u8; *size])).collect()
}
