//! Embedded Vega-Lite chart specifications
//!
//! A chart segment is parsed into a [`ChartSpec`]. Parsing never fails the
//! surrounding render: invalid JSON becomes [`ChartEmbed::Invalid`] and is
//! drawn as an inline error block. Drawing itself is delegated to a
//! [`ChartRenderer`].

use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative chart specification (Vega-Lite subset)
///
/// Only the fields the terminal renderer reads are typed; everything else is
/// kept in `extra` so the spec can be handed to other renderers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Schema reference, e.g. `https://vega.github.io/schema/vega-lite/v5.json`
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inline data block, usually `{"values": [...]}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Mark type as a string (`"bar"`) or definition object (`{"type": "line"}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<Value>,
    /// Encoding channels (`x`, `y`, `color`, ...)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub encoding: Map<String, Value>,
    /// Remaining top-level properties
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChartSpec {
    /// Parse a raw chart segment
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `raw` is not a JSON object of the expected shape
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw.trim())
    }

    /// Mark type name, e.g. `bar`, `line`, `point`
    pub fn mark_type(&self) -> Option<&str> {
        match self.mark.as_ref()? {
            Value::String(name) => Some(name.as_str()),
            Value::Object(def) => def.get("type").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Inline data rows, empty when the spec references external data
    pub fn values(&self) -> &[Value] {
        self.data
            .as_ref()
            .and_then(|d| d.get("values"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Field bound to an encoding channel
    pub fn field(&self, channel: &str) -> Option<&str> {
        self.encoding
            .get(channel)
            .and_then(|c| c.get("field"))
            .and_then(Value::as_str)
    }

    /// Measurement type bound to an encoding channel (`quantitative`, `ordinal`, ...)
    pub fn field_type(&self, channel: &str) -> Option<&str> {
        self.encoding
            .get(channel)
            .and_then(|c| c.get("type"))
            .and_then(Value::as_str)
    }
}

/// Result of embedding one chart segment
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEmbed {
    /// Successfully parsed specification
    Spec(Box<ChartSpec>),
    /// Segment that could not be parsed
    Invalid {
        /// Raw segment text
        raw: String,
        /// Parser error message
        error: String,
    },
}

impl ChartEmbed {
    /// Parse a chart segment, containing any failure
    pub fn from_segment(raw: &str) -> Self {
        match ChartSpec::parse(raw) {
            Ok(spec) => Self::Spec(Box::new(spec)),
            Err(e) => {
                tracing::warn!("Failed to parse chart specification: {}", e);
                Self::Invalid {
                    raw: raw.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Whether the segment parsed
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Spec(_))
    }
}

/// Collaborator that draws a parsed chart
pub trait ChartRenderer {
    /// Draw `spec` into displayable text
    fn render_chart(&self, spec: &ChartSpec) -> String;
}

/// Width in characters of the longest bar
const BAR_WIDTH: f64 = 40.0;

/// Terminal chart renderer
///
/// Prints a one-line summary of the spec. Bar charts with a quantitative
/// channel additionally get horizontal text bars.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextChartRenderer;

impl TextChartRenderer {
    fn bars(&self, spec: &ChartSpec) -> Option<Vec<String>> {
        let (label_channel, value_channel) = if spec.field_type("y") == Some("quantitative") {
            ("x", "y")
        } else if spec.field_type("x") == Some("quantitative") {
            ("y", "x")
        } else {
            return None;
        };
        let label_field = spec.field(label_channel)?;
        let value_field = spec.field(value_channel)?;

        let rows: Vec<(String, f64)> = spec
            .values()
            .iter()
            .filter_map(|row| {
                let value = row.get(value_field)?.as_f64()?;
                let label = match row.get(label_field)? {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((label, value))
            })
            .collect();
        if rows.is_empty() {
            return None;
        }

        let max = rows.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
        let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

        Some(
            rows.iter()
                .map(|(label, value)| {
                    let len = if max > 0.0 {
                        ((value.abs() / max) * BAR_WIDTH).round() as usize
                    } else {
                        0
                    };
                    format!(
                        "{:>width$} | {} {}",
                        label,
                        "█".repeat(len),
                        value,
                        width = label_width
                    )
                })
                .collect(),
        )
    }
}

impl ChartRenderer for TextChartRenderer {
    fn render_chart(&self, spec: &ChartSpec) -> String {
        let mark = spec.mark_type().unwrap_or("chart");
        let mut lines = vec![format!(
            "[{} chart, {} data points]",
            mark,
            spec.values().len()
        )
        .cyan()
        .to_string()];

        if let Some(description) = &spec.description {
            lines.push(description.clone());
        }

        if mark == "bar" {
            if let Some(bars) = self.bars(spec) {
                lines.extend(bars);
            }
        }

        lines.join("\n")
    }
}
