/// The audiotags module abstracts over tag reading and writing for five different audio formats,
/// exposing a single standard interface for all audio files.
///
/// Only the fields the tagger manages are touched. Anything else already present in a file's tag
/// container (for example the downloader's own encoder tags) is preserved on write.
use crate::common::dotted_extension;
use crate::error::{Result, VidtagError, VidtagExpectedError};
use crate::tagging_sets::SUPPORTED_AUDIO_EXTENSIONS;
use id3::frame::{Comment, Picture as Id3Picture, PictureType as Id3PictureType};
use id3::{Tag as Id3Tag, TagLike};
use metaflac::block::PictureType as FlacPictureType;
use metaflac::Tag as FlacTag;
use mp4ameta::{Data, Tag as Mp4Tag};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn from_path(p: &Path) -> Option<ImageMime> {
        match dotted_extension(p).as_str() {
            ".jpg" | ".jpeg" => Some(ImageMime::Jpeg),
            ".png" => Some(ImageMime::Png),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArt {
    pub mime: ImageMime,
    pub data: Vec<u8>,
}

impl CoverArt {
    pub fn from_file(p: &Path) -> Result<CoverArt> {
        let mime = ImageMime::from_path(p).ok_or_else(|| VidtagExpectedError::UnsupportedFiletype { path: p.to_path_buf() })?;
        Ok(CoverArt { mime, data: std::fs::read(p)? })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub composer: Option<String>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    pub comment: Option<String>,
    pub cover: Option<CoverArt>,

    pub path: PathBuf,
}

fn supported_extension(p: &Path) -> Result<String> {
    let extension = dotted_extension(p);
    if !SUPPORTED_AUDIO_EXTENSIONS.contains(&extension.as_str()) {
        return Err(VidtagExpectedError::UnsupportedFiletype { path: p.to_path_buf() }.into());
    }
    Ok(extension)
}

impl AudioTags {
    /// An empty tag set bound to `p`. Flushing it only writes the fields that are set.
    pub fn new(p: &Path) -> AudioTags {
        AudioTags { path: p.to_path_buf(), ..Default::default() }
    }

    pub fn from_file(p: &Path) -> Result<AudioTags> {
        match supported_extension(p)?.as_str() {
            ".mp3" => Self::from_mp3(p),
            ".m4a" => Self::from_m4a(p),
            ".flac" => Self::from_flac(p),
            _ => Self::from_ogg(p),
        }
    }

    fn from_mp3(p: &Path) -> Result<AudioTags> {
        let tag = Id3Tag::read_from_path(p).map_err(|e| VidtagError::Tag(format!("Failed to read ID3 tags from {}: {e}", p.display())))?;
        let cover = tag.pictures().find(|pic| pic.picture_type == Id3PictureType::CoverFront).map(|pic| CoverArt {
            mime: if pic.mime_type == "image/png" { ImageMime::Png } else { ImageMime::Jpeg },
            data: pic.data.clone(),
        });
        let comment = tag.comments().next().map(|c| c.text.clone());
        Ok(AudioTags {
            title: tag.title().map(String::from),
            artist: tag.artist().map(String::from),
            album: tag.album().map(String::from),
            composer: tag.get("TCOM").and_then(|f| f.content().text()).map(String::from),
            track_number: tag.track(),
            year: tag.year().or_else(|| tag.date_recorded().map(|d| d.year)).and_then(|y| u32::try_from(y).ok()),
            comment,
            cover,
            path: p.to_path_buf(),
        })
    }

    fn from_m4a(p: &Path) -> Result<AudioTags> {
        let tag = Mp4Tag::read_from_path(p).map_err(|e| VidtagError::Tag(format!("Failed to read MP4 tags from {}: {e}", p.display())))?;
        let cover = tag.artwork().map(|img| CoverArt {
            mime: match img.fmt {
                mp4ameta::ImgFmt::Png => ImageMime::Png,
                _ => ImageMime::Jpeg,
            },
            data: img.data.to_vec(),
        });
        Ok(AudioTags {
            title: tag.title().map(String::from),
            artist: tag.artist().map(String::from),
            album: tag.album().map(String::from),
            composer: tag.composer().map(String::from),
            track_number: tag.track_number().map(u32::from),
            year: tag.year().and_then(|y| y.get(..4)).and_then(|y| y.parse().ok()),
            comment: tag.comment().map(String::from),
            cover,
            path: p.to_path_buf(),
        })
    }

    fn from_flac(p: &Path) -> Result<AudioTags> {
        let tag = FlacTag::read_from_path(p).map_err(|e| VidtagError::Tag(format!("Failed to read FLAC tags from {}: {e}", p.display())))?;
        let first = |key: &str| tag.get_vorbis(key).and_then(|mut values| values.next()).map(String::from);
        let cover = tag.pictures().find(|pic| pic.picture_type == FlacPictureType::CoverFront).map(|pic| CoverArt {
            mime: if pic.mime_type == "image/png" { ImageMime::Png } else { ImageMime::Jpeg },
            data: pic.data.clone(),
        });
        Ok(AudioTags {
            title: first("TITLE"),
            artist: first("ARTIST"),
            album: first("ALBUM"),
            composer: first("COMPOSER"),
            track_number: first("TRACKNUMBER").and_then(|n| n.parse().ok()),
            year: first("DATE").and_then(|d| d.get(..4).and_then(|y| y.parse().ok())),
            comment: first("COMMENT"),
            cover,
            path: p.to_path_buf(),
        })
    }

    fn from_ogg(p: &Path) -> Result<AudioTags> {
        use lofty::prelude::{Accessor, ItemKey, TaggedFileExt};
        use lofty::probe::Probe;

        let tagged_file = Probe::open(p)
            .map_err(|e| VidtagError::Tag(format!("Failed to open file: {e}")))?
            .read()
            .map_err(|e| VidtagError::Tag(format!("Failed to read file: {e}")))?;
        let tag = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()).ok_or_else(|| VidtagError::Tag(format!("No tags found in {}", p.display())))?;
        let cover = tag.pictures().iter().find(|pic| pic.pic_type() == lofty::picture::PictureType::CoverFront).map(|pic| CoverArt {
            mime: if pic.mime_type() == Some(&lofty::picture::MimeType::Png) { ImageMime::Png } else { ImageMime::Jpeg },
            data: pic.data().to_vec(),
        });
        Ok(AudioTags {
            title: tag.title().map(|s| s.to_string()),
            artist: tag.artist().map(|s| s.to_string()),
            album: tag.album().map(|s| s.to_string()),
            composer: tag.get_string(&ItemKey::Composer).map(String::from),
            track_number: tag.track(),
            year: tag.get_string(&ItemKey::Year).and_then(|y| y.get(..4)).and_then(|y| y.parse().ok()),
            comment: tag.comment().map(|s| s.to_string()),
            cover,
            path: p.to_path_buf(),
        })
    }

    pub fn flush(&self) -> Result<()> {
        match supported_extension(&self.path)?.as_str() {
            ".mp3" => self.flush_mp3(),
            ".m4a" => self.flush_m4a(),
            ".flac" => self.flush_flac(),
            _ => self.flush_ogg(),
        }
    }

    fn flush_mp3(&self) -> Result<()> {
        let mut tag = Id3Tag::read_from_path(&self.path).unwrap_or_else(|_| Id3Tag::new());

        if let Some(title) = &self.title {
            tag.set_title(title);
        }
        if let Some(artist) = &self.artist {
            tag.set_artist(artist);
        }
        if let Some(album) = &self.album {
            tag.set_album(album);
        }
        if let Some(composer) = &self.composer {
            tag.set_text("TCOM", composer);
        }
        if let Some(n) = self.track_number {
            tag.set_track(n);
        }
        if let Some(year) = self.year.and_then(|y| i32::try_from(y).ok()) {
            tag.set_year(year);
        }
        if let Some(comment) = &self.comment {
            tag.remove_comment(Some(""), None);
            tag.add_frame(Comment { lang: "eng".to_string(), description: String::new(), text: comment.clone() });
        }
        if let Some(cover) = &self.cover {
            tag.remove_picture_by_type(Id3PictureType::CoverFront);
            tag.add_frame(Id3Picture {
                mime_type: cover.mime.as_str().to_string(),
                picture_type: Id3PictureType::CoverFront,
                description: String::new(),
                data: cover.data.clone(),
            });
        }

        tag.write_to_path(&self.path, id3::Version::Id3v24).map_err(|e| VidtagError::Tag(format!("Failed to write ID3 tags: {e}")))?;
        Ok(())
    }

    fn flush_m4a(&self) -> Result<()> {
        let mut tag = Mp4Tag::read_from_path(&self.path).map_err(|e| VidtagError::Tag(format!("Failed to read MP4 tags: {e}")))?;

        if let Some(title) = &self.title {
            tag.set_title(title.as_str());
        }
        if let Some(artist) = &self.artist {
            tag.set_artist(artist.as_str());
        }
        if let Some(album) = &self.album {
            tag.set_album(album.as_str());
        }
        if let Some(composer) = &self.composer {
            tag.set_composer(composer.as_str());
        }
        if let Some(n) = self.track_number.and_then(|n| u16::try_from(n).ok()) {
            tag.set_track_number(n);
        }
        if let Some(year) = self.year {
            tag.set_year(year.to_string());
        }
        if let Some(comment) = &self.comment {
            tag.set_comment(comment.as_str());
        }
        if let Some(cover) = &self.cover {
            let data = match cover.mime {
                ImageMime::Jpeg => Data::Jpeg(cover.data.clone()),
                ImageMime::Png => Data::Png(cover.data.clone()),
            };
            tag.set_data(mp4ameta::ident::ARTWORK, data);
        }

        tag.write_to_path(&self.path).map_err(|e| VidtagError::Tag(format!("Failed to write MP4 tags: {e}")))?;
        Ok(())
    }

    fn flush_flac(&self) -> Result<()> {
        let mut tag = FlacTag::read_from_path(&self.path).map_err(|e| VidtagError::Tag(format!("Failed to read FLAC tags: {e}")))?;

        let mut update_tag = |key: &str, value: Option<String>| {
            if let Some(val) = value {
                tag.set_vorbis(key, vec![val]);
            }
        };
        update_tag("TITLE", self.title.clone());
        update_tag("ARTIST", self.artist.clone());
        update_tag("ALBUM", self.album.clone());
        update_tag("COMPOSER", self.composer.clone());
        update_tag("TRACKNUMBER", self.track_number.map(|n| n.to_string()));
        update_tag("DATE", self.year.map(|y| y.to_string()));
        update_tag("COMMENT", self.comment.clone());

        if let Some(cover) = &self.cover {
            tag.remove_picture_type(FlacPictureType::CoverFront);
            tag.add_picture(cover.mime.as_str(), FlacPictureType::CoverFront, cover.data.clone());
        }

        tag.write_to_path(&self.path).map_err(|e| VidtagError::Tag(format!("Failed to write FLAC tags: {e}")))?;
        Ok(())
    }

    fn flush_ogg(&self) -> Result<()> {
        use lofty::config::WriteOptions;
        use lofty::picture::{MimeType, Picture, PictureType};
        use lofty::prelude::{Accessor, AudioFile, ItemKey, TaggedFileExt};
        use lofty::probe::Probe;
        use lofty::tag::Tag;

        let mut tagged_file = Probe::open(&self.path)
            .map_err(|e| VidtagError::Tag(format!("Failed to open file: {e}")))?
            .read()
            .map_err(|e| VidtagError::Tag(format!("Failed to read file: {e}")))?;

        if tagged_file.primary_tag().is_none() {
            let tag_type = tagged_file.primary_tag_type();
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file.primary_tag_mut().ok_or_else(|| VidtagError::Tag(format!("No writable tag in {}", self.path.display())))?;

        if let Some(title) = &self.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &self.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &self.album {
            tag.set_album(album.clone());
        }
        if let Some(composer) = &self.composer {
            tag.insert_text(ItemKey::Composer, composer.clone());
        }
        if let Some(n) = self.track_number {
            tag.set_track(n);
        }
        if let Some(year) = self.year {
            tag.insert_text(ItemKey::Year, year.to_string());
        }
        if let Some(comment) = &self.comment {
            tag.set_comment(comment.clone());
        }
        if let Some(cover) = &self.cover {
            let mime = match cover.mime {
                ImageMime::Jpeg => MimeType::Jpeg,
                ImageMime::Png => MimeType::Png,
            };
            tag.remove_picture_type(PictureType::CoverFront);
            tag.push_picture(Picture::new_unchecked(PictureType::CoverFront, Some(mime), None, cover.data.clone()));
        }

        tagged_file.save_to_path(&self.path, WriteOptions::default()).map_err(|e| VidtagError::Tag(format!("Failed to write OGG tags: {e}")))?;
        Ok(())
    }
}
