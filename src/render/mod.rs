//! Mixed-content rendering of model responses
//!
//! A response body is markdown prose with zero or more embedded chart
//! specifications. [`render`] turns one body into an ordered list of
//! [`RenderedSegment`]s:
//!
//! - [`segments`]: splits prose from chart fences
//! - [`blocks`]: parses the markdown subset in prose segments
//! - [`chart`]: parses chart fences and draws them
//! - [`terminal`]: paints rendered content to a terminal
//!
//! Rendering is pure: the same text and streaming flag always produce the same
//! output, so callers re-render the whole accumulated text after every
//! streamed delta.

pub mod blocks;
pub mod chart;
pub mod segments;
pub mod terminal;

pub use blocks::{parse_blocks, Block, Flavor, Inline};
pub use chart::{ChartEmbed, ChartRenderer, ChartSpec, TextChartRenderer};
pub use segments::{split_segments, ContentSegment};
pub use terminal::{paint, StreamPrinter};

/// One rendered segment of a response
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedSegment {
    /// Non-empty run of prose blocks
    Prose(Vec<Block>),
    /// Embedded chart (valid or not)
    Chart(ChartEmbed),
    /// Chart fence still being received
    PendingChart,
}

/// Flattened view of a rendered item, see [`Rendered::items`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderItem<'a> {
    /// Prose block
    Block(&'a Block),
    /// Embedded chart
    Chart(&'a ChartEmbed),
    /// Chart fence still being received
    PendingChart,
}

/// Rendered response body
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// Segments in document order, empty prose segments omitted
    pub segments: Vec<RenderedSegment>,
    /// Show the streaming caret after the last item
    pub show_caret: bool,
}

impl Rendered {
    /// All blocks and charts in document order
    pub fn items(&self) -> Vec<RenderItem<'_>> {
        let mut items = Vec::new();
        for segment in &self.segments {
            match segment {
                RenderedSegment::Prose(blocks) => items.extend(blocks.iter().map(RenderItem::Block)),
                RenderedSegment::Chart(embed) => items.push(RenderItem::Chart(embed)),
                RenderedSegment::PendingChart => items.push(RenderItem::PendingChart),
            }
        }
        items
    }

    /// Number of chart segments, valid or not
    pub fn chart_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, RenderedSegment::Chart(_)))
            .count()
    }

    /// Whether nothing visible was produced
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Render a response body
///
/// # Arguments
///
/// * `text` - Full text received so far
/// * `is_streaming` - Whether more text may still be appended to `text`
/// * `flavor` - Inline syntax recognized by the calling view
///
/// # Examples
///
/// ```
/// use studymate::render::{render, Flavor, RenderedSegment};
///
/// let text = "Plot:\n```json vega-lite\n{\"mark\":\"bar\"}```\nDone.";
/// let rendered = render(text, false, Flavor::Solution);
/// assert_eq!(rendered.chart_count(), 1);
/// assert_eq!(rendered.segments.len(), 3);
/// assert!(!rendered.show_caret);
/// ```
pub fn render(text: &str, is_streaming: bool, flavor: Flavor) -> Rendered {
    let segments = split_segments(text, is_streaming)
        .into_iter()
        .filter_map(|segment| match segment {
            ContentSegment::Prose(prose) => {
                let blocks = parse_blocks(&prose, flavor);
                (!blocks.is_empty()).then_some(RenderedSegment::Prose(blocks))
            }
            ContentSegment::Chart(raw) => Some(RenderedSegment::Chart(ChartEmbed::from_segment(&raw))),
            ContentSegment::PendingChart(_) => Some(RenderedSegment::PendingChart),
        })
        .collect();

    Rendered {
        segments,
        show_caret: is_streaming,
    }
}
