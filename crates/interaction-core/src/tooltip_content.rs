//! Structured hover content rendered as a self-contained HTML table

use chart_interact_shared::FieldMetadataSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::{plain_value, ValueFormatter};

const TOOLTIP_STYLE: &str = "<style>\
.tooltip-table{border-collapse:collapse;font-size:11px;margin:0;border-spacing:0;}\
.tooltip-label{color:#666;text-align:left;padding-right:6px;white-space:nowrap;vertical-align:top;}\
.tooltip-value{text-align:left;white-space:nowrap;font-weight:bold;}\
.tooltip-divider{height:4px;}\
</style>";

/// A categorical value shown as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionEntry {
    pub name: String,
    pub value: Value,
}

/// A numeric value formatted by the metadata of `field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureEntry {
    pub name: String,
    pub value: Value,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipContent {
    pub dimensions: Vec<DimensionEntry>,
    pub measures: Vec<MeasureEntry>,
}

impl TooltipContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dimensions.push(DimensionEntry {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn measure(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        field: impl Into<String>,
    ) -> Self {
        self.measures.push(MeasureEntry {
            name: name.into(),
            value: value.into(),
            field: field.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty() && self.measures.is_empty()
    }
}

/// Builds tooltip markup for one chart's field metadata
pub struct TooltipContentBuilder<'a> {
    formatter: ValueFormatter<'a>,
}

impl<'a> TooltipContentBuilder<'a> {
    pub fn new(metadata: &'a FieldMetadataSet) -> Self {
        Self {
            formatter: ValueFormatter::new(metadata),
        }
    }

    /// Dimension rows, a spacer when both groups are present, then measure rows.
    pub fn build(&self, content: &TooltipContent) -> String {
        let mut rows = String::new();

        for dim in &content.dimensions {
            push_row(
                &mut rows,
                self.formatter.display_name(&dim.name),
                &plain_value(&dim.value),
            );
        }

        if !content.dimensions.is_empty() && !content.measures.is_empty() {
            rows.push_str(r#"<tr class="tooltip-divider"><td colspan="2"></td></tr>"#);
        }

        for measure in &content.measures {
            let formatted = self.formatter.format(&measure.value, &measure.field);
            push_row(
                &mut rows,
                self.formatter.display_name(&measure.name),
                &formatted.to_string(),
            );
        }

        format!(r#"{TOOLTIP_STYLE}<table class="tooltip-table">{rows}</table>"#)
    }
}

fn push_row(rows: &mut String, label: &str, value: &str) {
    rows.push_str(r#"<tr><td class="tooltip-label">"#);
    rows.push_str(&escape_html(label));
    rows.push_str(r#":</td><td class="tooltip-value">"#);
    rows.push_str(&escape_html(value));
    rows.push_str("</td></tr>");
}

/// Escape text for use inside element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
