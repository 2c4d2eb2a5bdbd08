use crate::common::*;
use crate::testing;
use std::fs;

#[test]
fn test_uniq_preserves_order() {
    let items = vec!["a", "b", "c", "b", "d", "a"];
    let unique = uniq(items.into_iter().map(String::from).collect());
    assert_eq!(unique, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_sanitize_dirname_basic() {
    assert_eq!(sanitize_dirname("test:file?name", 180, false), "test_file_name");
    assert_eq!(sanitize_dirname("AC/DC", 180, false), "AC_DC");
}

#[test]
fn test_sanitize_dirname_trims() {
    assert_eq!(sanitize_dirname("  Spaced Out  ", 180, false), "Spaced Out");
}

#[test]
fn test_sanitize_dirname_truncation() {
    let result = sanitize_dirname("this_is_a_very_long_dirname_that_should_be_truncated", 20, true);
    assert_eq!(result.len(), 20);
}

#[test]
fn test_sanitize_filename_preserves_extension() {
    assert_eq!(sanitize_filename("test:file?.mp3", 180, false), "test_file_.mp3");

    let result = sanitize_filename("very_long_filename_that_needs_truncation.mp3", 20, true);
    assert!(result.ends_with(".mp3"));
    assert!(result.len() <= 24);
}

#[test]
fn test_sanitize_filename_long_extension_is_not_an_extension() {
    let result = sanitize_filename("file.verylongextension", 10, true);
    assert_eq!(result, "file.veryl");
}

#[test]
fn test_normalize() {
    let decomposed = "Beyonce\u{301}";
    assert_eq!(normalize(decomposed, Some(NormalizationForm::Nfc)), "Beyonc\u{e9}");
    assert_eq!(normalize("Beyonc\u{e9}", Some(NormalizationForm::Nfd)), decomposed);
    assert_eq!(normalize(decomposed, None), decomposed);
}

#[test]
fn test_dotted_extension() {
    assert_eq!(dotted_extension(std::path::Path::new("a/Song.M4A")), ".m4a");
    assert_eq!(dotted_extension(std::path::Path::new("noext")), "");
}

#[test]
fn test_move_file() {
    let temp_dir = testing::init();
    let src = testing::write_file(temp_dir.path(), "a.mp3", b"audio");
    let dst = temp_dir.path().join("b.mp3");

    move_file(&src, &dst).unwrap();
    assert!(!src.exists());
    assert_eq!(fs::read(&dst).unwrap(), b"audio");
}

#[test]
fn test_move_file_refuses_to_overwrite() {
    let temp_dir = testing::init();
    let src = testing::write_file(temp_dir.path(), "a.mp3", b"new");
    let dst = testing::write_file(temp_dir.path(), "b.mp3", b"old");

    assert!(move_file(&src, &dst).is_err());
    assert!(src.exists());
    assert_eq!(fs::read(&dst).unwrap(), b"old");
}

#[test]
fn test_move_file_missing_source() {
    let temp_dir = testing::init();
    let result = move_file(&temp_dir.path().join("missing.mp3"), &temp_dir.path().join("b.mp3"));
    assert!(matches!(
        result,
        Err(crate::error::VidtagError::Expected(crate::error::VidtagExpectedError::FileNotFound { .. }))
    ));
}
