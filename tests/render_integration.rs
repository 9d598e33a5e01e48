//! Integration tests for mixed prose and chart rendering

use studymate::render::{paint, render, Block, ChartEmbed, Flavor, RenderItem, RenderedSegment};
use studymate::{Locale, Translator};

const BAR_CHART: &str = r#"{
  "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
  "description": "Scores",
  "data": {"values": [{"subject": "Math", "score": 90}, {"subject": "Art", "score": 70}]},
  "mark": "bar",
  "encoding": {
    "x": {"field": "subject", "type": "nominal"},
    "y": {"field": "score", "type": "quantitative"}
  }
}"#;

fn fenced(body: &str) -> String {
    format!("```json vega-lite\n{}\n```", body)
}

#[test]
fn test_solution_with_chart_keeps_document_order() {
    let text = format!(
        "## Step 1\n\nCompare the scores.\n\n{}\n\n## Answer\n\nMath is higher.",
        fenced(BAR_CHART)
    );

    let rendered = render(&text, false, Flavor::Solution);

    assert_eq!(rendered.chart_count(), 1);
    let items = rendered.items();
    assert!(matches!(items[0], RenderItem::Block(Block::Heading { level: 2, .. })));
    let chart_position = items
        .iter()
        .position(|item| matches!(item, RenderItem::Chart(_)))
        .unwrap();
    assert_eq!(chart_position, 2);
    match items[chart_position] {
        RenderItem::Chart(ChartEmbed::Spec(spec)) => {
            assert_eq!(spec.mark_type(), Some("bar"));
            assert_eq!(spec.values().len(), 2);
        }
        other => panic!("expected a parsed chart, got {:?}", other),
    }
}

#[test]
fn test_invalid_chart_does_not_hide_surrounding_prose() {
    colored::control::set_override(false);
    let text = format!("Before\n\n{}\n\nAfter", fenced("{ not json"));
    let translator = Translator::new(Locale::En);

    let rendered = render(&text, false, Flavor::Solution);
    let painted = paint(&rendered, &translator);

    assert!(painted.contains("Before"));
    assert!(painted.contains("After"));
    assert!(painted.contains("Could not render the chart"));
}

#[test]
fn test_streaming_open_fence_is_pending_until_closed() {
    let partial = format!("Look:\n\n```json vega-lite\n{}", &BAR_CHART[..40]);

    let streaming = render(&partial, true, Flavor::Tutor);
    assert!(streaming.show_caret);
    assert_eq!(
        streaming.segments.last(),
        Some(&RenderedSegment::PendingChart)
    );
    assert_eq!(streaming.chart_count(), 0);

    let complete = format!("Look:\n\n{}", fenced(BAR_CHART));
    let done = render(&complete, false, Flavor::Tutor);
    assert!(!done.show_caret);
    assert_eq!(done.chart_count(), 1);
}

#[test]
fn test_translated_chart_messages() {
    colored::control::set_override(false);
    let text = fenced("[]oops");
    let translator = Translator::new(Locale::Ru);

    let painted = paint(&render(&text, false, Flavor::Solution), &translator);
    assert!(painted.contains("Не удалось отобразить график"));
}

#[test]
fn test_empty_text_renders_nothing() {
    let rendered = render("", false, Flavor::Solution);
    assert!(rendered.is_empty());
    assert!(rendered.items().is_empty());
}
