use crate::common::NormalizationForm;
use crate::config::*;
use crate::error::{VidtagError, VidtagExpectedError};
use crate::patterns::{SourceField, DEFAULT_TAG_DETECTION_PATTERNS};
use tempfile::TempDir;

fn write_config(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, contents).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_config_minimal() {
    let (_temp_dir, config_path) = write_config(
        r#"
        working_directory = "~/.vidtag-work"
        move_to_directory = "~/music"
        "#,
    );

    let config = Config::parse(Some(&config_path)).unwrap();

    let home = dirs::home_dir().unwrap();
    assert_eq!(config.working_directory, home.join(".vidtag-work"));
    assert_eq!(config.move_to_directory, home.join("music"));
    assert!(!config.verbose_output);
    assert!(config.embed_images);
    assert_eq!(config.normalize_filenames, Some(NormalizationForm::Nfc));
    assert_eq!(config.max_filename_bytes, 180);
    assert_eq!(config.rename_patterns.len(), crate::renamer::default_rename_patterns().len());
    assert_eq!(config.tag_detection_patterns.year.len(), DEFAULT_TAG_DETECTION_PATTERNS.year.len());
}

#[test]
fn test_config_full() {
    let (_temp_dir, config_path) = write_config(
        r#"
        working_directory = "/tmp/work"
        move_to_directory = "/tmp/library"
        verbose_output = true
        embed_images = false
        do_not_embed_image_uploaders = ["Art Channel"]
        ignore_upload_year_uploaders = ["Reupload Channel", "Archive"]
        normalize_filenames = "nfd"
        max_filename_bytes = 255

        [[rename_patterns]]
        pattern = '\s\[[\w-]{11}\](\.\w+)$'
        replacement = "{1}"
        description = "Remove the id"

        [[tag_detection_patterns.album]]
        pattern = '(?m)^From the album (.+)$'
        search_field = "description"
        match_group = 1
        note = "Album sentence"
        "#,
    );

    let config = Config::parse(Some(&config_path)).unwrap();

    assert_eq!(config.working_directory, std::path::PathBuf::from("/tmp/work"));
    assert_eq!(config.move_to_directory, std::path::PathBuf::from("/tmp/library"));
    assert!(config.verbose_output);
    assert!(!config.embed_images);
    assert_eq!(config.do_not_embed_image_uploaders, vec!["Art Channel"]);
    assert_eq!(config.ignore_upload_year_uploaders, vec!["Reupload Channel", "Archive"]);
    assert_eq!(config.normalize_filenames, Some(NormalizationForm::Nfd));
    assert_eq!(config.max_filename_bytes, 255);

    assert_eq!(config.rename_patterns.len(), 1);
    assert_eq!(config.rename_patterns[0].replacement, "{1}");
    assert_eq!(config.rename_patterns[0].description, "Remove the id");

    // Overridden kind is replaced, the rest keep the built-in lists.
    assert_eq!(config.tag_detection_patterns.album.len(), 1);
    assert_eq!(config.tag_detection_patterns.album[0].search_field, SourceField::Description);
    assert_eq!(config.tag_detection_patterns.album[0].note.as_deref(), Some("Album sentence"));
    assert_eq!(config.tag_detection_patterns.title.len(), DEFAULT_TAG_DETECTION_PATTERNS.title.len());
}

#[test]
fn test_config_normalization_disabled() {
    let (_temp_dir, config_path) = write_config(
        r#"
        working_directory = "/tmp/work"
        move_to_directory = "/tmp/library"
        normalize_filenames = "none"
        "#,
    );
    let config = Config::parse(Some(&config_path)).unwrap();
    assert_eq!(config.normalize_filenames, None);
}

#[test]
fn test_config_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let result = Config::parse(Some(&temp_dir.path().join("nope.toml")));
    assert!(matches!(result, Err(VidtagError::Expected(VidtagExpectedError::ConfigNotFound { .. }))));
}

#[test]
fn test_config_decode_error() {
    let (_temp_dir, config_path) = write_config("working_directory = ");
    let result = Config::parse(Some(&config_path));
    assert!(matches!(result, Err(VidtagError::Expected(VidtagExpectedError::ConfigDecode { .. }))));
}

#[test]
fn test_config_missing_key() {
    let (_temp_dir, config_path) = write_config(r#"working_directory = "/tmp/work""#);
    match Config::parse(Some(&config_path)) {
        Err(VidtagError::Expected(VidtagExpectedError::MissingConfigKey { key, .. })) => assert_eq!(key, "move_to_directory"),
        other => panic!("expected MissingConfigKey, got {other:?}"),
    }
}

#[test]
fn test_config_value_validation() {
    let cases = [
        ("embed_images = 1", "embed_images"),
        ("max_filename_bytes = -3", "max_filename_bytes"),
        ("do_not_embed_image_uploaders = \"Somebody\"", "do_not_embed_image_uploaders"),
        ("ignore_upload_year_uploaders = [1, 2]", "ignore_upload_year_uploaders"),
        ("normalize_filenames = \"nfz\"", "normalize_filenames"),
        ("[[rename_patterns]]\npattern = '(unclosed'\nreplacement = ''", "rename_patterns"),
    ];
    for (line, expected_key) in cases {
        let (_temp_dir, config_path) = write_config(&format!("working_directory = \"/w\"\nmove_to_directory = \"/m\"\n{line}\n"));
        match Config::parse(Some(&config_path)) {
            Err(VidtagError::Expected(VidtagExpectedError::InvalidConfigValue { key, .. })) => assert_eq!(key, expected_key),
            other => panic!("expected InvalidConfigValue for {line:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_config_unknown_keys_are_not_fatal() {
    let (_temp_dir, config_path) = write_config(
        r#"
        working_directory = "/tmp/work"
        move_to_directory = "/tmp/library"
        sleep_seconds_between_downloads = 3
        "#,
    );
    assert!(Config::parse(Some(&config_path)).is_ok());
}

#[test]
fn test_uploader_lists() {
    let config = Config {
        do_not_embed_image_uploaders: vec!["Art Channel".to_string()],
        ignore_upload_year_uploaders: vec!["Archive".to_string()],
        ..Config::default()
    };
    assert!(!config.embeds_images_for(Some("Art Channel")));
    assert!(config.embeds_images_for(Some("Other")));
    assert!(config.embeds_images_for(None));
    assert!(!config.infers_upload_year_for(Some("Archive")));
    assert!(config.infers_upload_year_for(None));
}
