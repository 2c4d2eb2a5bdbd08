/// The detection module applies pattern-bank scheme lists to a video's metadata.
///
/// Detection never fails loudly: a scheme that does not match, or a match that cannot be coerced
/// to the requested type, simply yields the caller's default.
use crate::common::uniq;
use crate::metadata::VideoMetadata;
use crate::patterns::DetectionScheme;
use tracing::debug;

/// Conversion from a captured text span into a typed tag value.
pub trait ParseDetected: Sized {
    fn parse_detected(text: &str) -> Option<Self>;
}

impl ParseDetected for String {
    fn parse_detected(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

impl ParseDetected for u16 {
    fn parse_detected(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl ParseDetected for u32 {
    fn parse_detected(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl ParseDetected for i32 {
    fn parse_detected(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

/// The trimmed text of the scheme's match group for the first match in its search field.
fn first_capture<'a>(video: &'a VideoMetadata, scheme: &DetectionScheme) -> Option<&'a str> {
    let captures = scheme.pattern.captures(scheme.search_field.text(video))?;
    let text = captures.get(scheme.match_group)?.as_str().trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Return the value captured by the first scheme, in list order, that matches. List order is the
/// precedence order; later schemes are not consulted once one matches, even when its value then
/// fails to convert to `T`.
pub fn detect_single<T: ParseDetected>(video: &VideoMetadata, schemes: &[DetectionScheme]) -> Option<T> {
    for scheme in schemes {
        if let Some(text) = first_capture(video, scheme) {
            debug!("Detected {:?} in {:?} using /{}/", text, scheme.search_field, scheme.pattern.as_str());
            return T::parse_detected(text);
        }
    }
    None
}

pub fn detect_single_or<T: ParseDetected>(video: &VideoMetadata, schemes: &[DetectionScheme], default: T) -> T {
    detect_single(video, schemes).unwrap_or(default)
}

/// Union every capture of every scheme, deduplicated in first-seen order and joined with
/// `separator`. Falls back to `default` when nothing matches.
pub fn detect_multiple(video: &VideoMetadata, schemes: &[DetectionScheme], default: Option<&str>, separator: &str) -> Option<String> {
    let mut found = Vec::new();
    for scheme in schemes {
        let text = scheme.search_field.text(video);
        for captures in scheme.pattern.captures_iter(text) {
            if let Some(m) = captures.get(scheme.match_group) {
                let value = m.as_str().trim();
                if !value.is_empty() {
                    found.push(value.to_string());
                }
            }
        }
    }

    let found = uniq(found);
    if found.is_empty() {
        return default.map(str::to_string);
    }
    debug!("Detected {} values using {} schemes", found.len(), schemes.len());
    Some(found.join(separator))
}
