//! Terminal painting of rendered content

use super::{render, Block, ChartEmbed, ChartRenderer, Flavor, Inline, RenderItem, Rendered};
use crate::i18n::Translator;
use crate::render::TextChartRenderer;
use colored::Colorize;
use std::io::Write;

/// Marker shown after the last item while a response is streaming
pub const STREAMING_CARET: &str = "▍";

/// Paint rendered content using the built-in text chart renderer
pub fn paint(rendered: &Rendered, translator: &Translator) -> String {
    paint_with(rendered, translator, &TextChartRenderer)
}

/// Paint rendered content with a custom chart renderer
pub fn paint_with(rendered: &Rendered, translator: &Translator, charts: &dyn ChartRenderer) -> String {
    let mut out = paint_items(&rendered.items(), translator, charts);
    if rendered.show_caret {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(STREAMING_CARET);
    }
    out
}

fn paint_items(items: &[RenderItem<'_>], translator: &Translator, charts: &dyn ChartRenderer) -> String {
    items
        .iter()
        .map(|item| paint_item(item, translator, charts))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn paint_item(item: &RenderItem<'_>, translator: &Translator, charts: &dyn ChartRenderer) -> String {
    match item {
        RenderItem::Block(block) => paint_block(block),
        RenderItem::Chart(ChartEmbed::Spec(spec)) => charts.render_chart(spec),
        RenderItem::Chart(ChartEmbed::Invalid { .. }) => {
            translator.t("chart.renderError").red().to_string()
        }
        RenderItem::PendingChart => translator.t("chart.pending").dimmed().to_string(),
    }
}

fn paint_block(block: &Block) -> String {
    match block {
        Block::Heading { level: 1, text } => text.bold().underline().to_string(),
        Block::Heading { level: 2, text } => text.bold().to_string(),
        Block::Heading { text, .. } => text.bold().cyan().to_string(),
        Block::UnorderedList(items) => items
            .iter()
            .map(|item| format!("  • {}", item))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::OrderedList(items) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("  {}. {}", idx + 1, item))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Paragraph(spans) => spans
            .iter()
            .map(|span| match span {
                Inline::Text(text) => text.clone(),
                Inline::Strong(text) => text.bold().to_string(),
                Inline::Code(text) => text.yellow().to_string(),
            })
            .collect(),
    }
}

/// Incremental printer for streamed responses
///
/// Only the trailing item of a streaming render may still change, so every
/// item before it is printed as soon as it appears and never re-painted.
/// [`StreamPrinter::finish`] prints whatever is left once the stream ends.
#[derive(Debug)]
pub struct StreamPrinter {
    flavor: Flavor,
    translator: Translator,
    printed: usize,
    last_painted: Option<String>,
}

impl StreamPrinter {
    /// Create a printer for one response
    pub fn new(flavor: Flavor, translator: Translator) -> Self {
        Self {
            flavor,
            translator,
            printed: 0,
            last_painted: None,
        }
    }

    /// Number of items already written
    pub fn printed(&self) -> usize {
        self.printed
    }

    /// Write items finalized by the latest accumulated text
    ///
    /// # Errors
    ///
    /// Returns error if writing to `out` fails
    pub fn update<W: Write>(&mut self, out: &mut W, text: &str) -> std::io::Result<()> {
        let rendered = render(text, true, self.flavor);
        let items = rendered.items();
        let finalized = items.len().saturating_sub(1);
        if finalized > self.printed {
            self.write_items(out, &items[self.printed..finalized])?;
            self.printed = finalized;
        }
        Ok(())
    }

    /// Write the remaining items of the final text
    ///
    /// The last item already written is written again if the final render
    /// changed it, e.g. when an unclosed chart fence falls back to prose.
    ///
    /// # Errors
    ///
    /// Returns error if writing to `out` fails
    pub fn finish<W: Write>(&mut self, out: &mut W, text: &str) -> std::io::Result<()> {
        let rendered = render(text, false, self.flavor);
        let items = rendered.items();

        let mut start = self.printed.min(items.len());
        if start > 0 {
            let repainted = self.paint_one(&items[start - 1]);
            if self.last_painted.as_deref() != Some(repainted.as_str()) {
                start -= 1;
            }
        }

        if items.len() > start {
            self.write_items(out, &items[start..])?;
        }
        self.printed = items.len();
        out.flush()
    }

    fn paint_one(&self, item: &RenderItem<'_>) -> String {
        paint_item(item, &self.translator, &TextChartRenderer)
    }

    fn write_items<W: Write>(&mut self, out: &mut W, items: &[RenderItem<'_>]) -> std::io::Result<()> {
        let painted = paint_items(items, &self.translator, &TextChartRenderer);
        writeln!(out, "{}\n", painted)?;
        self.last_painted = items.last().map(|item| self.paint_one(item));
        out.flush()
    }
}
