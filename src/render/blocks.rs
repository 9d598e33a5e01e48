//! Minimal markdown subset used by model responses
//!
//! Prose is split into blocks on runs of two or more newlines. Each block is
//! a heading, a bullet list, a numbered list or a paragraph with `**bold**`
//! spans. The tutor flavor additionally recognizes `` `inline code` ``.

use regex::Regex;
use std::sync::OnceLock;

/// Which inline syntax a view recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flavor {
    /// Solver output: bold spans only
    #[default]
    Solution,
    /// Tutor chat output: bold and inline code spans
    Tutor,
}

/// Inline span inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text
    Text(String),
    /// `**emphasized**` text, markers stripped
    Strong(String),
    /// `` `code` `` span, backticks stripped
    Code(String),
}

/// A rendered prose block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// `#`, `##` or `###` heading
    Heading {
        /// Heading level, 1 to 3
        level: u8,
        /// Heading text without the marker
        text: String,
    },
    /// Bullet list, one item per source line
    UnorderedList(Vec<String>),
    /// Numbered list, one item per source line, numerals discarded
    OrderedList(Vec<String>),
    /// Paragraph made of inline spans
    Paragraph(Vec<Inline>),
}

fn paragraph_break() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"\n\n+").expect("paragraph break pattern is valid"))
}

fn ordered_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^\d+\.\s").expect("ordered marker pattern is valid"))
}

fn inline_spans(flavor: Flavor) -> &'static Regex {
    static SOLUTION: OnceLock<Regex> = OnceLock::new();
    static TUTOR: OnceLock<Regex> = OnceLock::new();
    match flavor {
        Flavor::Solution => SOLUTION
            .get_or_init(|| Regex::new(r"\*\*.*?\*\*").expect("bold pattern is valid")),
        Flavor::Tutor => TUTOR.get_or_init(|| {
            Regex::new(r"\*\*.*?\*\*|`.*?`").expect("bold/code pattern is valid")
        }),
    }
}

/// Parse one prose segment into blocks
///
/// Whitespace-only blocks are dropped.
///
/// # Examples
///
/// ```
/// use studymate::render::blocks::{parse_blocks, Block, Flavor, Inline};
///
/// let blocks = parse_blocks("## Answer\n\n**42** it is", Flavor::Solution);
/// assert_eq!(blocks[0], Block::Heading { level: 2, text: "Answer".to_string() });
/// assert_eq!(
///     blocks[1],
///     Block::Paragraph(vec![
///         Inline::Strong("42".to_string()),
///         Inline::Text(" it is".to_string()),
///     ])
/// );
/// ```
pub fn parse_blocks(prose: &str, flavor: Flavor) -> Vec<Block> {
    paragraph_break()
        .split(prose)
        .filter(|block| !block.trim().is_empty())
        .map(|block| classify_block(block, flavor))
        .collect()
}

fn classify_block(block: &str, flavor: Flavor) -> Block {
    if let Some(text) = block.strip_prefix("### ") {
        return Block::Heading {
            level: 3,
            text: text.to_string(),
        };
    }
    if let Some(text) = block.strip_prefix("## ") {
        return Block::Heading {
            level: 2,
            text: text.to_string(),
        };
    }
    if let Some(text) = block.strip_prefix("# ") {
        return Block::Heading {
            level: 1,
            text: text.to_string(),
        };
    }

    if block.starts_with("* ") || block.starts_with("- ") {
        let items = block
            .lines()
            .map(|line| {
                line.strip_prefix("* ")
                    .or_else(|| line.strip_prefix("- "))
                    .unwrap_or(line)
                    .to_string()
            })
            .collect();
        return Block::UnorderedList(items);
    }

    let marker = ordered_marker();
    if marker.is_match(block) {
        let items = block
            .lines()
            .map(|line| marker.replace(line, "").into_owned())
            .collect();
        return Block::OrderedList(items);
    }

    Block::Paragraph(parse_inline(block, flavor))
}

/// Split paragraph text into plain, bold and (tutor only) code spans
pub fn parse_inline(text: &str, flavor: Flavor) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for found in inline_spans(flavor).find_iter(text) {
        if found.start() > cursor {
            spans.push(Inline::Text(text[cursor..found.start()].to_string()));
        }
        let raw = found.as_str();
        if let Some(inner) = raw.strip_prefix("**").and_then(|r| r.strip_suffix("**")) {
            spans.push(Inline::Strong(inner.to_string()));
        } else if let Some(inner) = raw.strip_prefix('`').and_then(|r| r.strip_suffix('`')) {
            spans.push(Inline::Code(inner.to_string()));
        }
        cursor = found.end();
    }

    if cursor < text.len() {
        spans.push(Inline::Text(text[cursor..].to_string()));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_headings_by_level() {
        let blocks = parse_blocks("# One\n\n## Two\n\n### Three", Flavor::Solution);
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "One".to_string()
                },
                Block::Heading {
                    level: 2,
                    text: "Two".to_string()
                },
                Block::Heading {
                    level: 3,
                    text: "Three".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_heading_marker_needs_space() {
        let blocks = parse_blocks("#hashtag", Flavor::Solution);
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("#hashtag")])]);
    }

    #[test]
    fn test_unordered_list_items_per_line() {
        let blocks = parse_blocks("* first\n- second\n* third", Flavor::Solution);
        assert_eq!(
            blocks,
            vec![Block::UnorderedList(vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
            ])]
        );
    }

    #[test]
    fn test_ordered_list_discards_numerals() {
        let blocks = parse_blocks("1. alpha\n2. beta\n10. gamma", Flavor::Solution);
        assert_eq!(
            blocks,
            vec![Block::OrderedList(vec![
                "alpha".to_string(),
                "beta".to_string(),
                "gamma".to_string(),
            ])]
        );
    }

    #[test]
    fn test_number_without_space_is_paragraph() {
        let blocks = parse_blocks("3.14 is pi", Flavor::Solution);
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("3.14 is pi")])]);
    }

    #[test]
    fn test_blank_runs_split_and_empty_blocks_dropped() {
        let blocks = parse_blocks("\n\nfirst\n\n\n\n   \n\nsecond\n\n", Flavor::Solution);
        assert_eq!(
            blocks,
            vec![
                Block::Paragraph(vec![text("first")]),
                Block::Paragraph(vec![text("second")]),
            ]
        );
    }

    #[test]
    fn test_single_newline_stays_in_paragraph() {
        let blocks = parse_blocks("line one\nline two", Flavor::Solution);
        assert_eq!(blocks, vec![Block::Paragraph(vec![text("line one\nline two")])]);
    }

    #[test]
    fn test_bold_spans() {
        let spans = parse_inline("The **answer** is **4**.", Flavor::Solution);
        assert_eq!(
            spans,
            vec![
                text("The "),
                Inline::Strong("answer".to_string()),
                text(" is "),
                Inline::Strong("4".to_string()),
                text("."),
            ]
        );
    }

    #[test]
    fn test_inline_code_only_in_tutor_flavor() {
        let solution = parse_inline("call `main()` now", Flavor::Solution);
        assert_eq!(solution, vec![text("call `main()` now")]);

        let tutor = parse_inline("call `main()` now", Flavor::Tutor);
        assert_eq!(
            tutor,
            vec![
                text("call "),
                Inline::Code("main()".to_string()),
                text(" now")
            ]
        );
    }

    #[test]
    fn test_unclosed_bold_is_plain_text() {
        let spans = parse_inline("some **bold", Flavor::Tutor);
        assert_eq!(spans, vec![text("some **bold")]);
    }

    #[test]
    fn test_bold_does_not_span_lines() {
        let spans = parse_inline("**a\nb**", Flavor::Solution);
        assert_eq!(spans, vec![text("**a\nb**")]);
    }
}
