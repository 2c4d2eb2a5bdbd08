/// The patterns module holds the pattern bank: ordered lists of detection schemes, one list per tag
/// kind, used to infer tags that the video metadata does not state explicitly.
///
/// Most of the built-in schemes target the auto-generated description that music distributors
/// attach to uploads, which looks like:
///
/// ```text
/// Provided to YouTube by Some Distributor
///
/// Song Title · Main Artist · Featured Artist
///
/// Album Title
///
/// ℗ 2019 Some Label
///
/// Released on: 2019-05-10
///
/// Composer: Jane Doe
/// ```
///
/// List order is precedence order. For single-valued kinds the first scheme that matches wins, so
/// the more specific schemes come first.
use crate::metadata::VideoMetadata;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

/// The metadata field a scheme searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceField {
    Title,
    Description,
}

impl SourceField {
    pub fn text<'a>(&self, video: &'a VideoMetadata) -> &'a str {
        match self {
            SourceField::Title => &video.title,
            SourceField::Description => video.description_text(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionScheme {
    #[serde(with = "serde_regex")]
    pub pattern: Regex,
    pub search_field: SourceField,
    #[serde(default = "default_match_group")]
    pub match_group: usize,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_match_group() -> usize {
    1
}

impl DetectionScheme {
    /// Build a scheme from a pattern known to be valid. Only used for the built-in bank.
    fn builtin(pattern: &str, search_field: SourceField, match_group: usize, note: &str) -> DetectionScheme {
        DetectionScheme {
            pattern: Regex::new(pattern).unwrap(),
            search_field,
            match_group,
            note: Some(note.to_string()),
        }
    }

    pub fn new(pattern: Regex, search_field: SourceField, match_group: usize) -> DetectionScheme {
        DetectionScheme { pattern, search_field, match_group, note: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Title,
    Artist,
    Album,
    Composer,
    Year,
}

/// One ordered scheme list per tag kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TagDetectionPatterns {
    pub title: Vec<DetectionScheme>,
    pub artist: Vec<DetectionScheme>,
    pub album: Vec<DetectionScheme>,
    pub composer: Vec<DetectionScheme>,
    pub year: Vec<DetectionScheme>,
}

impl TagDetectionPatterns {
    pub fn for_kind(&self, kind: TagKind) -> &[DetectionScheme] {
        match kind {
            TagKind::Title => &self.title,
            TagKind::Artist => &self.artist,
            TagKind::Album => &self.album,
            TagKind::Composer => &self.composer,
            TagKind::Year => &self.year,
        }
    }
}

impl Default for TagDetectionPatterns {
    fn default() -> Self {
        DEFAULT_TAG_DETECTION_PATTERNS.clone()
    }
}

// The track line is the first non-empty line after the distributor line. Its segments are
// separated by a middle dot: `Title · Artist · Artist`.
const TRACK_LINE: &str = r"(?m)^Provided to YouTube by [^\n]*\n\s*\n";

lazy_static! {
    pub static ref DEFAULT_TAG_DETECTION_PATTERNS: TagDetectionPatterns = TagDetectionPatterns {
        title: vec![
            DetectionScheme::builtin(
                &format!(r"{TRACK_LINE}([^\n·]+?) · "),
                SourceField::Description,
                1,
                "Auto-generated track line",
            ),
            DetectionScheme::builtin(r"(?m)^Title: ([^\n]+)$", SourceField::Description, 1, "Title: line"),
            DetectionScheme::builtin(
                r"^[^\n]+? [-–] ([^\n]+?)(?:\s*[\(\[](?i:official|lyrics?|audio|music video|visualizer)[^\)\]]*[\)\]])*$",
                SourceField::Title,
                1,
                "Artist - Title",
            ),
        ],
        artist: vec![
            DetectionScheme::builtin(
                &format!(r"{TRACK_LINE}[^\n·]+? · ([^\n·]+)"),
                SourceField::Description,
                1,
                "Auto-generated track line",
            ),
            DetectionScheme::builtin(r"(?m)^Artist: ([^\n]+)$", SourceField::Description, 1, "Artist: line"),
            DetectionScheme::builtin(r"^([^\n]+?) [-–] [^\n]+$", SourceField::Title, 1, "Artist - Title"),
        ],
        album: vec![
            DetectionScheme::builtin(
                &format!(r"{TRACK_LINE}[^\n]+ · [^\n]+\n\s*\n([^\n]+)"),
                SourceField::Description,
                1,
                "Line after the auto-generated track line",
            ),
            DetectionScheme::builtin(r"(?m)^Album: ([^\n]+)$", SourceField::Description, 1, "Album: line"),
        ],
        composer: vec![
            DetectionScheme::builtin(r"(?m)^Composer: ([^\n]+)$", SourceField::Description, 1, "Composer: line"),
            DetectionScheme::builtin(r"(?m)^Composer, Lyricist: ([^\n]+)$", SourceField::Description, 1, "Composer, Lyricist: line"),
            DetectionScheme::builtin(r"(?m)^Lyricist, Composer: ([^\n]+)$", SourceField::Description, 1, "Lyricist, Composer: line"),
            DetectionScheme::builtin(r"(?m)^Written by: ([^\n]+)$", SourceField::Description, 1, "Written by: line"),
            DetectionScheme::builtin(r"(?m)^Music: ([^\n]+)$", SourceField::Description, 1, "Music: line"),
        ],
        year: vec![
            DetectionScheme::builtin(r"(?m)^Released on: ([12]\d{3})-\d{2}-\d{2}", SourceField::Description, 1, "Released on: line"),
            DetectionScheme::builtin(r"℗ ([12]\d{3})\b", SourceField::Description, 1, "Phonographic copyright year"),
            DetectionScheme::builtin(r"(?m)^Year: ([12]\d{3})\b", SourceField::Description, 1, "Year: line"),
            DetectionScheme::builtin(r"[\(\[]([12]\d{3})[\)\]]", SourceField::Title, 1, "Bracketed year in title"),
        ],
    };
}
