/// The metadata module parses the JSON sidecar files the downloader writes next to each audio file
/// (one per video) and, for playlist and channel downloads, the single collection-level sidecar.
use crate::error::{Result, VidtagExpectedError};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Description of a single source video. Only the fields the tagger consumes are modelled; the
/// downloader writes many more, which are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub fulltitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub uploader_url: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub channel_url: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// `YYYYMMDD`
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub playlist_title: Option<String>,
    #[serde(default)]
    pub playlist_index: Option<u32>,
    #[serde(default)]
    pub playlist_id: Option<String>,
    #[serde(default)]
    pub release_year: Option<u32>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub composer: Option<String>,
}

impl VideoMetadata {
    pub fn from_file(p: &Path) -> Result<VideoMetadata> {
        let contents = read_sidecar(p)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn upload_date(&self) -> Option<NaiveDate> {
        parse_upload_date(self.upload_date.as_deref()?)
    }

    pub fn upload_year(&self) -> Option<u32> {
        self.upload_date().and_then(|d| u32::try_from(d.year()).ok())
    }

    /// The uploader name, falling back to the channel name. Blank values count as absent.
    pub fn uploader_name(&self) -> Option<&str> {
        non_blank(self.uploader.as_deref()).or_else(|| non_blank(self.channel.as_deref()))
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Description of the playlist or channel a batch of videos was downloaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub uploader_url: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub playlist_count: Option<u32>,
}

impl CollectionMetadata {
    pub fn from_file(p: &Path) -> Result<CollectionMetadata> {
        let contents = read_sidecar(p)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn uploader_name(&self) -> Option<&str> {
        non_blank(self.uploader.as_deref())
    }

    pub fn title_text(&self) -> Option<&str> {
        non_blank(Some(self.title.as_str()))
    }
}

fn read_sidecar(p: &Path) -> Result<String> {
    fs::read_to_string(p).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => VidtagExpectedError::FileNotFound { path: p.to_path_buf() }.into(),
        _ => e.into(),
    })
}

pub fn parse_upload_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d").ok()
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
