use crate::audiotags::*;
use crate::error::{VidtagError, VidtagExpectedError};
use crate::testing;

#[test]
fn test_mp3_write_and_read_back() {
    let temp_dir = testing::init();
    let p = testing::write_file(temp_dir.path(), "Morning Light [dQw4w9WgXcQ].mp3", &[0u8; 2048]);

    let mut tags = AudioTags::new(&p);
    tags.title = Some("Morning Light".to_string());
    tags.artist = Some("The Examples".to_string());
    tags.album = Some("Greatest Hits".to_string());
    tags.composer = Some("Ana Example; Bo Example".to_string());
    tags.track_number = Some(3);
    tags.comment = Some("URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string());
    tags.cover = Some(CoverArt { mime: ImageMime::Jpeg, data: b"\xff\xd8\xff\xe0cover".to_vec() });
    tags.flush().unwrap();

    let read = AudioTags::from_file(&p).unwrap();
    assert_eq!(read.title.as_deref(), Some("Morning Light"));
    assert_eq!(read.artist.as_deref(), Some("The Examples"));
    assert_eq!(read.album.as_deref(), Some("Greatest Hits"));
    assert_eq!(read.composer.as_deref(), Some("Ana Example; Bo Example"));
    assert_eq!(read.track_number, Some(3));
    assert_eq!(read.comment.as_deref(), Some("URL: https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
    assert_eq!(read.cover.map(|c| c.data), Some(b"\xff\xd8\xff\xe0cover".to_vec()));
}

#[test]
fn test_mp3_flush_only_writes_set_fields() {
    let temp_dir = testing::init();
    let p = testing::write_file(temp_dir.path(), "a [dQw4w9WgXcQ].mp3", &[0u8; 512]);

    let mut tags = AudioTags::new(&p);
    tags.title = Some("First".to_string());
    tags.album = Some("Kept Album".to_string());
    tags.flush().unwrap();

    let mut tags = AudioTags::new(&p);
    tags.title = Some("Second".to_string());
    tags.flush().unwrap();

    let read = AudioTags::from_file(&p).unwrap();
    assert_eq!(read.title.as_deref(), Some("Second"));
    assert_eq!(read.album.as_deref(), Some("Kept Album"));
    assert_eq!(read.artist, None);
}

#[test]
fn test_mp3_comment_is_replaced() {
    let temp_dir = testing::init();
    let p = testing::write_file(temp_dir.path(), "a [dQw4w9WgXcQ].mp3", &[0u8; 512]);

    for text in ["old comment", "new comment"] {
        let mut tags = AudioTags::new(&p);
        tags.comment = Some(text.to_string());
        tags.flush().unwrap();
    }
    assert_eq!(AudioTags::from_file(&p).unwrap().comment.as_deref(), Some("new comment"));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = testing::init();
    let p = testing::write_file(temp_dir.path(), "a [dQw4w9WgXcQ].wav", b"RIFF");
    assert!(matches!(
        AudioTags::from_file(&p),
        Err(VidtagError::Expected(VidtagExpectedError::UnsupportedFiletype { .. }))
    ));
    assert!(matches!(
        AudioTags::new(&p).flush(),
        Err(VidtagError::Expected(VidtagExpectedError::UnsupportedFiletype { .. }))
    ));
}

#[test]
fn test_corrupt_container_fails_to_flush() {
    let temp_dir = testing::init();
    let p = testing::write_file(temp_dir.path(), "a [dQw4w9WgXcQ].m4a", b"definitely not an mp4 container");
    let mut tags = AudioTags::new(&p);
    tags.title = Some("Title".to_string());
    assert!(matches!(tags.flush(), Err(VidtagError::Tag(_))));
}

#[test]
fn test_cover_art_from_file() {
    let temp_dir = testing::init();
    let p = testing::write_file(temp_dir.path(), "cover.png", b"\x89PNG");
    let cover = CoverArt::from_file(&p).unwrap();
    assert_eq!(cover.mime, ImageMime::Png);
    assert_eq!(cover.mime.as_str(), "image/png");
    assert_eq!(cover.data, b"\x89PNG");

    let p = testing::write_file(temp_dir.path(), "cover.gif", b"GIF89a");
    assert!(CoverArt::from_file(&p).is_err());
}
