//! Splitting raw model output into prose and chart segments
//!
//! Charts are embedded as fenced blocks tagged `json vega-lite`:
//!
//! ~~~text
//! ```json vega-lite
//! { "mark": "bar", ... }
//! ```
//! ~~~
//!
//! Splitting yields prose and chart segments in document order. While a
//! response is still streaming, a final fence that has been opened but not yet
//! closed is reported as [`ContentSegment::PendingChart`] so that the prose
//! before it is not re-flowed when the fence closes.

use regex::Regex;
use std::sync::OnceLock;

/// Opening marker of an embedded chart specification
pub const CHART_FENCE_OPEN: &str = "```json vega-lite\n";

/// Closing marker of an embedded chart specification
pub const CHART_FENCE_CLOSE: &str = "```";

/// One piece of a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    /// Markdown prose
    Prose(String),
    /// Raw body of a complete chart fence
    Chart(String),
    /// Body received so far of a chart fence that is still open (streaming only)
    PendingChart(String),
}

impl ContentSegment {
    /// Whether this is a complete chart segment
    pub fn is_chart(&self) -> bool {
        matches!(self, Self::Chart(_))
    }

    /// Whether this is a prose segment
    pub fn is_prose(&self) -> bool {
        matches!(self, Self::Prose(_))
    }
}

fn chart_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```json vega-lite\n(.*?)```").expect("chart fence pattern is valid")
    })
}

/// Split `text` into alternating prose and chart segments
///
/// The result always starts and ends with a prose segment (possibly empty), so
/// for N complete fences there are exactly N chart segments and N + 1 prose
/// segments. When `is_streaming` is true and the tail contains an unclosed
/// opening fence, the tail is split into its prose part and a trailing
/// [`ContentSegment::PendingChart`].
///
/// # Examples
///
/// ```
/// use studymate::render::segments::{split_segments, ContentSegment};
///
/// let text = "Intro\n```json vega-lite\n{\"mark\":\"bar\"}```\nOutro";
/// let segments = split_segments(text, false);
/// assert_eq!(segments.len(), 3);
/// assert_eq!(segments[1], ContentSegment::Chart("{\"mark\":\"bar\"}".to_string()));
/// ```
pub fn split_segments(text: &str, is_streaming: bool) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in chart_fence().captures_iter(text) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        segments.push(ContentSegment::Prose(text[cursor..whole.start()].to_string()));
        segments.push(ContentSegment::Chart(body.as_str().to_string()));
        cursor = whole.end();
    }

    let tail = &text[cursor..];
    match tail.find(CHART_FENCE_OPEN) {
        Some(open) if is_streaming => {
            segments.push(ContentSegment::Prose(tail[..open].to_string()));
            segments.push(ContentSegment::PendingChart(
                tail[open + CHART_FENCE_OPEN.len()..].to_string(),
            ));
        }
        _ => segments.push(ContentSegment::Prose(tail.to_string())),
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fence(body: &str) -> String {
        format!("{}{}{}", CHART_FENCE_OPEN, body, CHART_FENCE_CLOSE)
    }

    #[test]
    fn test_no_fences_is_single_prose_segment() {
        let segments = split_segments("# Title\n\nSome text", false);
        assert_eq!(
            segments,
            vec![ContentSegment::Prose("# Title\n\nSome text".to_string())]
        );
    }

    #[test]
    fn test_fences_alternate_with_prose() {
        let text = format!("a{}b{}c", fence("{\"x\":1}"), fence("{\"y\":2}"));
        let segments = split_segments(&text, false);

        assert_eq!(segments.len(), 5);
        assert_eq!(segments.iter().filter(|s| s.is_chart()).count(), 2);
        for (idx, segment) in segments.iter().enumerate() {
            assert_eq!(segment.is_chart(), idx % 2 == 1);
        }
        assert_eq!(segments[0], ContentSegment::Prose("a".to_string()));
        assert_eq!(segments[1], ContentSegment::Chart("{\"x\":1}".to_string()));
        assert_eq!(segments[4], ContentSegment::Prose("c".to_string()));
    }

    #[test]
    fn test_fence_body_may_span_blank_lines() {
        let text = fence("{\n\n  \"mark\": \"bar\"\n}\n");
        let segments = split_segments(&text, false);
        assert_eq!(
            segments[1],
            ContentSegment::Chart("{\n\n  \"mark\": \"bar\"\n}\n".to_string())
        );
    }

    #[test]
    fn test_unclosed_fence_is_prose_when_final() {
        let text = format!("intro\n\n{}{{\"mark\"", CHART_FENCE_OPEN);
        let segments = split_segments(&text, false);
        assert_eq!(segments, vec![ContentSegment::Prose(text.clone())]);
    }

    #[test]
    fn test_unclosed_fence_is_pending_while_streaming() {
        let text = format!("intro\n\n{}{{\"mark\"", CHART_FENCE_OPEN);
        let segments = split_segments(&text, true);
        assert_eq!(
            segments,
            vec![
                ContentSegment::Prose("intro\n\n".to_string()),
                ContentSegment::PendingChart("{\"mark\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_other_code_fences_are_prose() {
        let text = "```python\nprint(1)\n```";
        let segments = split_segments(text, false);
        assert_eq!(segments, vec![ContentSegment::Prose(text.to_string())]);
    }
}
