//! Chart layout and rendering-context helpers shared by the chart renderers

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chart_interact_shared::data_point::parse_time_millis;
use chart_interact_shared::BoxSize;

use crate::format::plain_value;
use crate::host::ChartContainer;
use crate::tooltip_content::escape_html;

/// Height used when the container has not been laid out yet
pub const FALLBACK_HEIGHT: f64 = 500.0;

pub const DEFAULT_NO_DATA_MESSAGE: &str = "No data available to display";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 20.0,
            right: 20.0,
            bottom: 70.0,
            left: 70.0,
        }
    }
}

/// Outer box, margins and the drawable area inside them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub margin: Margins,
    pub inner_width: f64,
    pub inner_height: f64,
}

impl ChartLayout {
    pub fn from_container(size: BoxSize, margin: Option<Margins>) -> Self {
        let margin = margin.unwrap_or_default();
        let height = if size.height > 0.0 {
            size.height
        } else {
            FALLBACK_HEIGHT
        };

        Self {
            width: size.width,
            height,
            margin,
            inner_width: size.width - margin.left - margin.right,
            inner_height: height - margin.top - margin.bottom,
        }
    }

    /// Whether there is any room left to draw in
    pub fn is_drawable(&self) -> bool {
        self.inner_width > 0.0 && self.inner_height > 0.0
    }
}

/// Prepare `container` for a fresh render.
///
/// Returns `false` when there is nothing to render into or nothing to
/// render; an empty dataset leaves `message` in the container.
pub fn validate_rendering_context<C: ChartContainer + ?Sized>(
    container: Option<&C>,
    dataset_len: usize,
    message: &str,
) -> bool {
    let Some(container) = container else {
        log::error!("Container element is null or undefined");
        return false;
    };

    if dataset_len == 0 {
        container.set_html(&format!("<p>{}</p>", escape_html(message)));
        return false;
    }

    container.set_html("");
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    Year,
    Month,
    Week,
    Day,
}

impl TimeGrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeGrain::Year => "year",
            TimeGrain::Month => "month",
            TimeGrain::Week => "week",
            TimeGrain::Day => "day",
        }
    }
}

/// Guess the grain of a time dimension from its name
pub fn determine_time_grain(dimension: Option<&str>) -> TimeGrain {
    let name = dimension.unwrap_or_default().to_lowercase();

    if name.contains("year") {
        TimeGrain::Year
    } else if name.contains("month") {
        TimeGrain::Month
    } else if name.contains("week") {
        TimeGrain::Week
    } else {
        TimeGrain::Day
    }
}

/// Axis/tooltip label for a time value.
///
/// Numeric time dimensions (a bare year, a week number) print as they are.
/// Dates, given as epoch milliseconds or date strings, print as
/// `YYYY-MM-DD` in UTC; anything unparseable prints as-is.
pub fn format_time_value(time: &Value, numeric_time: bool) -> String {
    if numeric_time {
        return plain_value(time);
    }

    let millis = match time {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_time_millis(s),
        _ => None,
    };

    millis
        .filter(|ms| ms.is_finite())
        .and_then(|ms| DateTime::from_timestamp_millis(ms as i64))
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| plain_value(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ResizeSubscription;
    use chart_interact_shared::InteractionResult;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Div {
        html: RefCell<String>,
    }

    impl ChartContainer for Div {
        fn container_key(&self) -> String {
            "div".into()
        }
        fn box_size(&self) -> BoxSize {
            BoxSize::new(0.0, 0.0)
        }
        fn set_html(&self, html: &str) {
            *self.html.borrow_mut() = html.to_string();
        }
        fn observe_resize(
            &self,
            _on_change: Rc<dyn Fn()>,
        ) -> InteractionResult<Box<dyn ResizeSubscription>> {
            unimplemented!()
        }
    }

    #[test]
    fn test_layout_defaults() {
        let layout = ChartLayout::from_container(BoxSize::new(800.0, 400.0), None);
        assert_eq!(layout.inner_width, 710.0);
        assert_eq!(layout.inner_height, 310.0);
        assert!(layout.is_drawable());

        let collapsed = ChartLayout::from_container(BoxSize::new(600.0, 0.0), None);
        assert_eq!(collapsed.height, 500.0);
        assert_eq!(collapsed.inner_height, 410.0);
    }

    #[test]
    fn test_layout_custom_margins() {
        let margin = Margins {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        };
        let layout = ChartLayout::from_container(BoxSize::new(100.0, 50.0), Some(margin));
        assert_eq!((layout.inner_width, layout.inner_height), (100.0, 50.0));

        let narrow = ChartLayout::from_container(BoxSize::new(60.0, 300.0), None);
        assert!(!narrow.is_drawable());
    }

    #[test]
    fn test_validate_rendering_context() {
        let div = Div::default();
        *div.html.borrow_mut() = "<svg></svg>".into();

        assert!(validate_rendering_context(Some(&div), 3, DEFAULT_NO_DATA_MESSAGE));
        assert_eq!(*div.html.borrow(), "");

        assert!(!validate_rendering_context(Some(&div), 0, "Nothing here"));
        assert_eq!(*div.html.borrow(), "<p>Nothing here</p>");

        assert!(!validate_rendering_context::<Div>(None, 10, DEFAULT_NO_DATA_MESSAGE));
    }

    #[test]
    fn test_time_grain() {
        assert_eq!(determine_time_grain(Some("order_year")), TimeGrain::Year);
        assert_eq!(determine_time_grain(Some("Fiscal MONTH")), TimeGrain::Month);
        assert_eq!(determine_time_grain(Some("iso_week")), TimeGrain::Week);
        assert_eq!(determine_time_grain(Some("order_date")), TimeGrain::Day);
        assert_eq!(determine_time_grain(None), TimeGrain::Day);
        // First match wins
        assert_eq!(determine_time_grain(Some("year_month")), TimeGrain::Year);
    }

    #[test]
    fn test_format_time_value() {
        assert_eq!(format_time_value(&json!(2024), true), "2024");
        assert_eq!(format_time_value(&json!("2024-03-05"), false), "2024-03-05");
        assert_eq!(
            format_time_value(&json!("2024-03-05T23:30:00Z"), false),
            "2024-03-05"
        );
        assert_eq!(format_time_value(&json!(1_709_596_800_000_i64), false), "2024-03-05");
        assert_eq!(format_time_value(&json!("soon"), false), "soon");
    }
}
