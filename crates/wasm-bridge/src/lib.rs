//! WASM bridge for the chart interaction layer
//! Exposes value formatting, tooltip markup, nearest-point lookup and the
//! `InteractionLayer` page object to JavaScript.

use std::sync::Once;

use chart_interact_core::format::DEFAULT_LABEL_LENGTH;
use chart_interact_core::nearest::DEFAULT_TIME_FIELD;
use chart_interact_core::{
    darken_fill, determine_time_grain, format_by_metadata, format_compact, format_time_value,
    nearest_by_euclidean, nearest_by_time, truncate_label, DisplayValue, TimeScale,
    TooltipContent, TooltipContentBuilder,
};
use chart_interact_shared::{DataRecord, FieldMetadataSet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod dom;
pub mod instance_manager;
pub mod layer;
pub mod timers;

pub use layer::InteractionLayer;

/// Route `log` output to the browser console and panics to `console.error`.
/// Safe to call more than once; only the first call takes effect.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: Option<String>) {
    static INIT: Once = Once::new();
    INIT.call_once(move || {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        let level = level
            .as_deref()
            .and_then(|l| l.parse::<log::Level>().ok())
            .unwrap_or(log::Level::Info);
        // Another logger may already be installed by the host page
        let _ = console_log::init_with_level(level);
    });
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

/// `undefined`/`null` read as the type's default
fn from_js<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(Into::into)
}

/// `1.5M`, `2.3K`, or a grouped number below a thousand
#[wasm_bindgen(js_name = formatCompact)]
pub fn format_compact_js(value: f64) -> String {
    format_compact(value)
}

/// Format `value` for `field` using `metadata` (`[{physical_name,
/// display_name, data_type}]`). Percentage fields, unknown fields and
/// non-numeric types come back unchanged.
#[wasm_bindgen(js_name = formatByMetadata)]
pub fn format_by_metadata_js(value: JsValue, field: &str, metadata: JsValue) -> Result<JsValue, JsValue> {
    let value: Value = from_js(value)?;
    let metadata: FieldMetadataSet = from_js(metadata)?;

    match format_by_metadata(&value, field, &metadata) {
        DisplayValue::Empty => Ok(JsValue::from_str("")),
        DisplayValue::Text(text) => Ok(JsValue::from_str(&text)),
        DisplayValue::Raw(raw) => to_js(&raw),
    }
}

#[wasm_bindgen(js_name = truncateLabel)]
pub fn truncate_label_js(text: Option<String>, max_length: Option<u32>) -> Option<String> {
    let max_length = max_length.map_or(DEFAULT_LABEL_LENGTH, |m| m as usize);
    text.map(|t| truncate_label(&t, max_length))
}

#[wasm_bindgen(js_name = getDisplayName)]
pub fn display_name_js(physical_name: &str, metadata: JsValue) -> Result<String, JsValue> {
    let metadata: FieldMetadataSet = from_js(metadata)?;
    Ok(metadata.display_name(physical_name).to_string())
}

/// Tooltip table markup for `{dimensions: [{name, value}], measures: [{name, value, field}]}`
#[wasm_bindgen(js_name = buildTooltip)]
pub fn build_tooltip_js(content: JsValue, metadata: JsValue) -> Result<String, JsValue> {
    let content: TooltipContent = from_js(content)?;
    let metadata: FieldMetadataSet = from_js(metadata)?;
    Ok(TooltipContentBuilder::new(&metadata).build(&content))
}

/// Closest `{x, y}` point to the pointer, returned with its `distance`;
/// `null` for no points
#[wasm_bindgen(js_name = nearestByEuclidean)]
pub fn nearest_by_euclidean_js(pointer_x: f64, pointer_y: f64, points: JsValue) -> Result<JsValue, JsValue> {
    let points: Vec<DataRecord> = from_js(points)?;

    match nearest_by_euclidean(pointer_x, pointer_y, &points) {
        Some(found) => {
            let mut fields = found.point.fields().clone();
            fields.insert("distance".to_string(), Value::from(found.distance));
            to_js(&fields)
        }
        None => Ok(JsValue::NULL),
    }
}

/// Any object with an `invert(pixel)` method, such as a d3 scale
struct JsTimeScale {
    scale: JsValue,
    invert: js_sys::Function,
}

impl JsTimeScale {
    fn new(scale: JsValue) -> Result<Self, JsValue> {
        let invert = js_sys::Reflect::get(&scale, &JsValue::from_str("invert"))?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| JsValue::from_str("scale has no invert() method"))?;
        Ok(Self { scale, invert })
    }
}

impl TimeScale for JsTimeScale {
    fn invert(&self, pixel: f64) -> f64 {
        match self.invert.call1(&self.scale, &JsValue::from_f64(pixel)) {
            Ok(time) => time
                .as_f64()
                .or_else(|| time.dyn_ref::<js_sys::Date>().map(js_sys::Date::get_time))
                .unwrap_or(f64::NAN),
            Err(e) => {
                log::error!("scale.invert failed: {e:?}");
                f64::NAN
            }
        }
    }
}

/// Point of a time-sorted series closest in time to the pointer.
/// Times are epoch milliseconds or date strings.
#[wasm_bindgen(js_name = nearestByTime)]
pub fn nearest_by_time_js(
    pointer_x: f64,
    scale: JsValue,
    points: JsValue,
    time_field: Option<String>,
) -> Result<JsValue, JsValue> {
    let scale = JsTimeScale::new(scale)?;
    let points: Vec<DataRecord> = from_js(points)?;
    let time_field = time_field.as_deref().unwrap_or(DEFAULT_TIME_FIELD);

    match nearest_by_time(pointer_x, &scale, &points, time_field) {
        Some(point) => to_js(point),
        None => Ok(JsValue::NULL),
    }
}

/// `year`, `month`, `week` or `day`
#[wasm_bindgen(js_name = determineTimeGrain)]
pub fn determine_time_grain_js(dimension: Option<String>) -> String {
    determine_time_grain(dimension.as_deref()).as_str().to_string()
}

#[wasm_bindgen(js_name = formatTimeValue)]
pub fn format_time_value_js(time: JsValue, numeric_time: bool) -> Result<String, JsValue> {
    let time: Value = match time.dyn_ref::<js_sys::Date>() {
        Some(date) => Value::from(date.get_time()),
        None => from_js(time)?,
    };
    Ok(format_time_value(&time, numeric_time))
}

/// The hover highlight color for `fill`; `undefined` when it is not a color
#[wasm_bindgen(js_name = darkenColor)]
pub fn darken_color_js(fill: &str, factor: f64) -> Option<String> {
    darken_fill(fill, factor)
}
